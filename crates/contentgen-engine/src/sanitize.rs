use std::borrow::Cow;
use std::sync::OnceLock;

use contentgen_contracts::ContentType;
use regex::Regex;

fn fence_opener() -> &'static Regex {
    static OPENER: OnceLock<Regex> = OnceLock::new();
    OPENER.get_or_init(|| {
        Regex::new(r"^```[A-Za-z0-9_+.\-]*[ \t]*$").expect("fence opener pattern is valid")
    })
}

/// Cleans normalized text for display.
///
/// Long-form text loses a fence that wraps the whole body; any markdown image
/// pointing at `image_url` is dropped since the image is shown on its own.
pub fn sanitize_content(text: &str, content_type: ContentType, image_url: Option<&str>) -> String {
    let unfenced = if content_type.is_long_form() {
        strip_wrapping_fence(text)
    } else {
        Cow::Borrowed(text)
    };
    match image_url.filter(|url| !url.is_empty()) {
        Some(url) => remove_image_markup(&unfenced, url).into_owned(),
        None => unfenced.into_owned(),
    }
}

/// Removes the opening and closing fence lines when one fenced block spans
/// the whole (trimmed) text. Anything less clear-cut is returned untouched:
/// no closing fence, fence lines in the middle, or text after the opener.
pub fn strip_wrapping_fence(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return Cow::Borrowed(text);
    }
    let first = lines[0];
    let last = lines[lines.len() - 1];
    if !fence_opener().is_match(first) || last.trim_end() != "```" {
        return Cow::Borrowed(text);
    }
    let inner = &lines[1..lines.len() - 1];
    if inner.iter().any(|line| is_fence_line(line)) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(inner.join("\n"))
}

fn is_fence_line(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Drops the first `![alt](image_url)` whose target is exactly `image_url`.
pub fn remove_image_markup<'a>(text: &'a str, image_url: &str) -> Cow<'a, str> {
    let pattern = format!(r"!\[[^\]]*\]\({}\)", regex::escape(image_url));
    match Regex::new(&pattern) {
        Ok(re) => re.replacen(text, 1, ""),
        Err(_) => Cow::Borrowed(text),
    }
}
