//! External process execution.
//!
//! The [`ProcessRunner`] trait is the seam between the download logic and the
//! operating system: [`SystemRunner`] spawns real processes, while tests plug
//! in a deterministic double (see `crate::testing::MockProcessRunner`).
//!
//! Output is fully buffered. The runner is only used for tools whose stdout
//! and stderr are short (status lines, JSON), never for media streams.

mod error;
mod system;
mod traits;
mod types;

pub use error::ProcessError;
pub use system::SystemRunner;
pub use traits::ProcessRunner;
pub use types::{ProcessInvocation, ProcessOutcome};
