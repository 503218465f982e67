use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Longest key accepted by every backend (S3 allows 1024 bytes).
const MAX_KEY_LEN: usize = 1024;

/// A validated blob locator.
///
/// Keys are `/`-separated relative paths. Every segment is non-empty and free
/// of traversal patterns, so a key can be mapped onto a filesystem directory
/// layout or an object-store path without escaping its root.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobKey(String);

impl BlobKey {
    /// Parse and validate a key string.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if s.is_empty() {
            return Err(StorageError::InvalidKey("key cannot be empty".into()));
        }

        if s.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key exceeds {MAX_KEY_LEN} bytes"
            )));
        }

        if s.chars().any(|c| c.is_control()) {
            return Err(StorageError::InvalidKey(
                "key must not contain control characters".into(),
            ));
        }

        if s.contains('\\') {
            return Err(StorageError::InvalidKey(
                "key must not contain backslashes".into(),
            ));
        }

        for segment in s.split('/') {
            match segment {
                "" => {
                    return Err(StorageError::InvalidKey(
                        "key must not contain empty segments".into(),
                    ));
                }
                "." | ".." => {
                    return Err(StorageError::InvalidKey(
                        "key must not contain '.' or '..' segments".into(),
                    ));
                }
                _ => {}
            }
        }

        Ok(Self(s.to_owned()))
    }

    /// Join segments with `/` and validate the result.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("/");
        Self::parse(&joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobKey({})", self.0)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for BlobKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BlobKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
