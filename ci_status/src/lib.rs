//! CI status tracking: the record embedded in a tracking issue body.
//!
//! A CI run reports its outcome once. The previous record is pulled out of
//! the issue body, merged with the new run, and spliced back in. The issue
//! body is the only durable store.

pub mod classify;
pub mod codec;
pub mod merge;
pub mod models;

pub use classify::{decide, IssueAction, IssueState, RunClass};
pub use codec::{decode, encode, extract, splice, CodecError, CLOSE_MARKER, OPEN_MARKER};
pub use merge::{merge, FieldUpdate};
pub use models::{RunOutcome, Snapshot, Status};
