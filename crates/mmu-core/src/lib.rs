//! Core types and reconciliation logic for mm-user-mgmt (mmu)
//!
//! This crate converges desired user state (CSV rows, email lists, membership
//! requests) onto a Mattermost server through its REST API.
//!
//! All remote operations go through the [`api::PlatformApi`] trait so that:
//! - The real HTTP client and the dry-run recorder are interchangeable
//! - Reconciliation never branches on dry-run vs. execute
//! - Tests can drive the reconciler against an in-memory platform

pub mod api;
pub mod batch;
pub mod config;
pub mod input;
pub mod logging;
pub mod naming;
pub mod reconcile;
pub mod schema;

pub use api::{ApiError, PlatformApi};
pub use batch::{BatchAborted, BatchReport, Summary, run_batch};
pub use config::Settings;
pub use reconcile::{Action, MembershipAction, Outcome, Reconciler};
pub use schema::{Channel, RemoteUser, Team, UserRecord};
