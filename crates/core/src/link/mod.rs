//! Link extraction from free-form message text.
//!
//! Users paste links in many shapes: markdown links copied from other apps,
//! plain `https://` URLs, or bare domains like `youtu.be/xyz`. This module
//! finds the first usable one and normalizes it into a [`url::Url`].

mod error;
mod extractor;

pub use error::LinkError;
pub use extractor::extract_link;
