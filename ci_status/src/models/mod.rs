//! Data model for the persisted status record.

pub mod run;
pub mod status;

pub use run::RunOutcome;
pub use status::{Snapshot, Status};
