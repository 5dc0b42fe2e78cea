use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid relative path {path:?}: {reason}")]
pub struct InvalidRelativePath {
    pub path: String,
    pub reason: &'static str,
}

/// A path relative to a Holding's music namespace, e.g. `CD1/01 - Song.flac`.
///
/// Guaranteed non-empty, not absolute, and free of `.`/`..`/empty segments,
/// so it can never escape `<holdingId>/music/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath(String);

impl RelativePath {
    pub fn parse(path: &str) -> Result<Self, InvalidRelativePath> {
        let invalid = |reason| InvalidRelativePath {
            path: path.to_string(),
            reason,
        };

        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if path.starts_with('/') || path.starts_with('\\') {
            return Err(invalid("path must be relative"));
        }
        if path.contains('\\') || path.contains('\0') {
            return Err(invalid("path contains a forbidden character"));
        }
        for segment in path.split('/') {
            match segment {
                "" => return Err(invalid("path contains an empty segment")),
                "." | ".." => return Err(invalid("path contains a dot segment")),
                _ => {}
            }
        }

        Ok(Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path with every segment percent-encoded, ready to be appended to
    /// a URL.
    pub fn url_encoded(&self) -> String {
        self.0
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
