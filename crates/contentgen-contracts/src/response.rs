use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate content. Please try again.";

/// Shape of the `content` field, decided once when the response is parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    RawText(String),
    StructuredPayload(Map<String, Value>),
    Other(Value),
}

impl Default for ContentPayload {
    fn default() -> Self {
        ContentPayload::Other(Value::Null)
    }
}

impl From<Value> for ContentPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => ContentPayload::RawText(text),
            Value::Object(map) => ContentPayload::StructuredPayload(map),
            other => ContentPayload::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for ContentPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(ContentPayload::from)
    }
}

/// Body of a 2xx reply. Nothing in it is trusted; every field tolerates
/// being absent or mistyped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerationResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, alias = "contentType", deserialize_with = "lenient_string")]
    pub content_type: Option<String>,
    #[serde(default, alias = "imageUrl", deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub content: ContentPayload,
}

impl GenerationResponse {
    /// Image URL with blank values treated as absent.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// Extracts the `detail` message from a failure body, if it is a string.
pub fn error_detail(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("detail")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// What the view keeps after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedResult {
    pub display_text: String,
    pub image_url: Option<String>,
    pub content_type: String,
}
