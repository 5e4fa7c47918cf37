//! Progress feedback towards the requester.
//!
//! Two kinds of feedback exist:
//!
//! - a [`Marker`](crate::chat::Marker) on the original message, replaced at
//!   each phase transition and cleared when the pipeline is done;
//! - an [`ActivitySignal`], a background task re-sending a chat activity
//!   indicator until it is stopped.
//!
//! Both are best effort. Failures are logged and never change the outcome of
//! a request.

mod activity;
mod reporter;

pub use activity::{ActivitySignal, ACTIVITY_INTERVAL};
pub use reporter::StatusReporter;
