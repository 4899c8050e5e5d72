//! Account deactivation by email

use super::{Action, Outcome, Reconciler};
use crate::api::ApiError;
use tracing::info;

impl Reconciler<'_> {
    /// Deactivate the account with this email.
    ///
    /// An unknown email is returned as [`ApiError::NotFound`]; an account that
    /// is already deactivated is skipped.
    pub fn disable_user(&self, email: &str) -> Result<Outcome, ApiError> {
        let user = self.api.get_user_by_email(email)?;
        if user.is_disabled() {
            info!("{email}: already disabled");
            return Ok(Outcome::new(Action::Skipped, email, "already disabled"));
        }

        self.api.disable_user(&user.id)?;
        info!("{email}: disabled");
        Ok(Outcome::new(Action::Disabled, email, "deactivated account"))
    }
}
