//! Channel membership command implementation

use super::run::{RunArgs, run};
use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use mm_user_mgmt_core::MembershipAction;
use mm_user_mgmt_core::config::discover_settings;
use mm_user_mgmt_core::naming::looks_like_email;
use std::path::Path;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChannelAction {
    Add,
    Remove,
}

impl From<ChannelAction> for MembershipAction {
    fn from(action: ChannelAction) -> Self {
        match action {
            ChannelAction::Add => MembershipAction::Add,
            ChannelAction::Remove => MembershipAction::Remove,
        }
    }
}

/// Add a user to, or remove a user from, an existing channel
#[derive(Args, Debug)]
pub struct ChannelArgs {
    /// User email
    #[arg(long)]
    email: String,

    /// Team name (display name or handle)
    #[arg(long)]
    team: String,

    /// Channel name (display name or handle)
    #[arg(long)]
    channel: String,

    /// Membership change to make
    #[arg(long, value_enum)]
    action: ChannelAction,

    #[command(flatten)]
    run: RunArgs,
}

/// Execute the channel command
pub fn execute(args: ChannelArgs, config: Option<&Path>) -> Result<()> {
    let settings = discover_settings(config, false)?;

    let email = args.email.trim().to_lowercase();
    if !looks_like_email(&email) {
        bail!("Invalid email '{}'", args.email);
    }
    let action = MembershipAction::from(args.action);

    run(
        "channel",
        &args.run,
        &settings,
        &[email],
        |email| email.as_str(),
        |reconciler, email| {
            reconciler.set_channel_membership(email, &args.team, &args.channel, action)
        },
    )
}
