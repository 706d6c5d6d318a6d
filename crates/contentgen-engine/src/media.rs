use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::DownloadError;

pub const GENERATED_IMAGE_STEM: &str = "generated-image";
const DEFAULT_IMAGE_SUBTYPE: &str = "png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub path: PathBuf,
    pub media_type: Option<String>,
    pub bytes: usize,
}

/// Download filename: the last non-empty path segment, or `generated-image.<subtype>`.
pub fn derive_image_filename(image_url: &str, media_type: Option<&str>) -> String {
    if let Some(segment) = last_path_segment(image_url) {
        return segment;
    }
    format!("{GENERATED_IMAGE_STEM}.{}", media_subtype(media_type))
}

fn last_path_segment(image_url: &str) -> Option<String> {
    let parsed = Url::parse(image_url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;
    let decoded = urlencoding::decode(segment)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let cleaned: String = decoded
        .chars()
        .filter(|ch| !matches!(ch, '/' | '\\' | '\0'))
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned)
}

/// `image/svg+xml; charset=utf-8` -> `svg`; anything unusable -> `png`.
pub fn media_subtype(media_type: Option<&str>) -> String {
    let Some(raw) = media_type else {
        return DEFAULT_IMAGE_SUBTYPE.to_string();
    };
    let essence = raw.split(';').next().unwrap_or_default().trim();
    let subtype = essence
        .split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or_default();
    let subtype = subtype.split('+').next().unwrap_or_default().trim();
    let cleaned: String = subtype
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '.')
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.is_empty() {
        DEFAULT_IMAGE_SUBTYPE.to_string()
    } else {
        cleaned
    }
}

/// Media type from the response header when it names an image, else sniffed from the bytes.
pub fn detect_media_type(header: Option<&str>, bytes: &[u8]) -> Option<String> {
    if let Some(value) = header
        .map(str::trim)
        .filter(|value| value.to_ascii_lowercase().starts_with("image/"))
    {
        return Some(value.to_string());
    }
    ::image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Fetches the image once and writes it into `dir` under the derived filename.
pub fn download_image(
    http: &HttpClient,
    image_url: &str,
    dir: &Path,
) -> Result<SavedImage, DownloadError> {
    let target = Url::parse(image_url)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .ok_or_else(|| DownloadError::NotDownloadable(image_url.to_string()))?;
    let response = http.get(target).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            status: status.as_u16(),
        });
    }
    let header = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes()?.to_vec();
    let media_type = detect_media_type(header.as_deref(), &bytes);
    let filename = derive_image_filename(image_url, media_type.as_deref());
    let path = dir.join(filename);
    save_bytes(&path, &bytes)?;
    Ok(SavedImage {
        path,
        media_type,
        bytes: bytes.len(),
    })
}

fn save_bytes(path: &Path, bytes: &[u8]) -> Result<(), DownloadError> {
    let to_error = |err: std::io::Error| DownloadError::Save {
        path: path.display().to_string(),
        message: err.to_string(),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, bytes).map_err(to_error)
}
