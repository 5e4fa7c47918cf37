//! Durable storage for artifacts that are too large to send inline.
//!
//! A [`DurableStore`] takes a local file and returns a public URL where the
//! file can be downloaded for a limited time. [`FileBinStore`] implements it
//! on top of [filebin](https://github.com/espebra/filebin2):
//!
//! 1. the SHA-256 of the file is computed by streaming it from disk,
//! 2. the file is uploaded to a fresh, randomly named bin (expects `201`),
//! 3. the bin is locked so its content becomes read-only (expects `200`).
//!
//! Any step failing aborts the whole operation.

mod config;
mod error;
mod filebin;
mod traits;

pub use config::FileBinConfig;
pub use error::{StoreError, StoreStage};
pub use filebin::FileBinStore;
pub use traits::DurableStore;
