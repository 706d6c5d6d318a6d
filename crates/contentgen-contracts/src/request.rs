use std::fmt;

use serde::Serialize;
use url::Url;

use crate::content_type::ContentType;

pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Unvalidated form input, exactly as the user typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    pub url: String,
    pub content_type: String,
    pub with_image: bool,
    pub image_prompt_override: Option<String>,
    pub aspect_ratio: Option<String>,
}

impl RawForm {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    /// Checks every field and either returns the wire request or all field errors.
    pub fn validate(&self) -> Result<GenerationRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let url = match parse_absolute_url(&self.url) {
            Ok(url) => Some(url),
            Err(message) => {
                errors.push("url", message);
                None
            }
        };

        let content_type = if self.content_type.trim().is_empty() {
            errors.push("content_type", "Please select a content type.");
            None
        } else {
            match self.content_type.parse::<ContentType>() {
                Ok(value) => Some(value),
                Err(message) => {
                    errors.push("content_type", message);
                    None
                }
            }
        };

        let mut image = None;
        if self.with_image {
            let aspect_ratio = match self
                .aspect_ratio
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
            {
                Some(raw) => {
                    if is_valid_aspect_ratio(raw) {
                        Some(raw.to_string())
                    } else {
                        errors.push(
                            "aspect_ratio",
                            format!("Aspect ratio '{raw}' must look like W:H, e.g. 16:9."),
                        );
                        None
                    }
                }
                None => Some(DEFAULT_ASPECT_RATIO.to_string()),
            };
            if let Some(aspect_ratio) = aspect_ratio {
                image = Some(ImageOptions {
                    image_prompt_override: self
                        .image_prompt_override
                        .as_deref()
                        .map(str::trim)
                        .filter(|value| !value.is_empty())
                        .map(str::to_string),
                    aspect_ratio,
                });
            }
        }

        match (url, content_type) {
            (Some(url), Some(content_type)) if errors.is_empty() => Ok(GenerationRequest {
                url: url.to_string(),
                content_type,
                image,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_absolute_url(raw: &str) -> Result<Url, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Please enter a URL.".to_string());
    }
    let parsed = Url::parse(trimmed).map_err(|_| format!("'{trimmed}' is not a valid URL."))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(format!("'{trimmed}' must be an absolute http(s) URL."));
    }
    Ok(parsed)
}

fn is_valid_aspect_ratio(raw: &str) -> bool {
    let Some((width, height)) = raw.split_once(':') else {
        return false;
    };
    let positive = |part: &str| part.trim().parse::<u32>().map(|v| v > 0).unwrap_or(false);
    positive(width) && positive(height)
}

/// Extra body fields for the image-producing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOptions {
    pub image_prompt_override: Option<String>,
    pub aspect_ratio: String,
}

/// A validated request. Built once per submission and dropped after the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub url: String,
    pub content_type: ContentType,
    #[serde(flatten)]
    pub image: Option<ImageOptions>,
}

impl GenerationRequest {
    pub fn with_image(&self) -> bool {
        self.image.is_some()
    }

    /// Endpoint path relative to the service base.
    pub fn endpoint_path(&self) -> &'static str {
        if self.with_image() {
            "generate-content-with-image"
        } else {
            "generate-content"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<String>>();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
