//! Size based routing of finished downloads.
//!
//! Artifacts up to [`DEFAULT_INLINE_LIMIT`] bytes are sent to the requester
//! as a video attachment. Anything larger is uploaded to a
//! [`DurableStore`](crate::store::DurableStore) and the requester gets a
//! message with a download button instead.

mod config;
mod error;
mod router;
mod types;

pub use config::{DeliveryConfig, DEFAULT_INLINE_LIMIT};
pub use error::DeliveryError;
pub use router::DeliveryRouter;
pub use types::{size_mb, Delivery};
