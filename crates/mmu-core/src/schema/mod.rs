//! Data types exchanged with the platform and parsed from input files

mod record;
mod remote;

pub use record::UserRecord;
pub use remote::{Channel, NewUser, RemoteUser, Team, UserPatch};
