// src/image_ref.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Locator of a raster image: either an embedded `data:` URL or a plain URL.
///
/// Every surface holds its own copy; references are only ever passed by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_url(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// Short form for log lines; data URLs can be megabytes long.
    pub fn summary(&self) -> String {
        if self.is_data_url() {
            let media_type = self.0[5..]
                .split([';', ','])
                .next()
                .filter(|m| !m.is_empty())
                .unwrap_or("unknown");
            format!("data:{} ({} bytes)", media_type, self.0.len())
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
