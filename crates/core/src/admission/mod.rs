//! Admission control for concurrent downloads.
//!
//! The [`AdmissionGate`] bounds how many downloads may run at once. Callers
//! acquire an [`AdmissionPermit`] before starting work; the slot is returned
//! when the permit is dropped, so every acquire is paired with exactly one
//! release by construction.
//!
//! A gate with capacity `0` does not limit anything, which keeps tests and
//! single-user deployments simple.

mod error;
mod gate;

pub use error::AdmissionError;
pub use gate::{AdmissionGate, AdmissionPermit, MAX_CAPACITY};
