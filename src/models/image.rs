use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider-assigned identifier of a generated image (UUID-shaped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: &str) -> Self {
        ImageId(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a decoded image ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImage {
    pub file_name: String,
    pub url_path: String,
}
