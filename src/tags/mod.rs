//! Tag extraction for uploaded files.
//!
//! A non-audio upload (cover art, logs, cue sheets) is an expected input and
//! is reported as [`Extraction::NotAudio`] rather than as an error.

mod extractor;
mod record;

pub use extractor::extract;
pub use record::{Extraction, TagRecord, TagValue};

#[cfg(test)]
pub(crate) use extractor::tests::flac_with_comments;
