//! Enrollment status state machine
//!
//! - `history`: queries over the persisted "before" state of a batch
//! - `transition`: the per-location transition rule table

pub mod history;
pub mod transition;

pub use history::PersistedHistories;
pub use transition::{check_transition, Rejection, TransitionFlags};
