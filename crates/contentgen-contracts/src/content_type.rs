use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target publishing channel for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    X,
    Facebook,
    Linkedin,
    Newsletter,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Blog,
        ContentType::X,
        ContentType::Facebook,
        ContentType::Linkedin,
        ContentType::Newsletter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::X => "x",
            ContentType::Facebook => "facebook",
            ContentType::Linkedin => "linkedin",
            ContentType::Newsletter => "newsletter",
        }
    }

    /// Long-form output is the only kind that gets its wrapping code fence removed.
    pub fn is_long_form(&self) -> bool {
        matches!(self, ContentType::Blog)
    }

    pub fn wire_names() -> Vec<&'static str> {
        Self::ALL.iter().map(ContentType::as_str).collect()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Unknown content type '{}'. Expected one of: {}.",
                    raw.trim(),
                    Self::wire_names().join(", ")
                )
            })
    }
}
