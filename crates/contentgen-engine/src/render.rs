use contentgen_contracts::NormalizedResult;
use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// GFM-flavoured rule set. The same rules apply to every content type.
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Renders service text as HTML.
///
/// Embedded HTML is shown as literal text, and link or image targets with a
/// scheme other than http, https or mailto are emptied.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, markdown_options()).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        Event::Start(Tag::Link(kind, dest, title)) => {
            Event::Start(Tag::Link(kind, safe_destination(dest), title))
        }
        Event::Start(Tag::Image(kind, dest, title)) => {
            Event::Start(Tag::Image(kind, safe_destination(dest), title))
        }
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
    if is_safe_destination(&dest) {
        dest
    } else {
        CowStr::Borrowed("")
    }
}

/// Relative references and http(s)/mailto targets.
pub fn is_safe_destination(dest: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme.
    let compact: String = dest
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .collect();
    let Some(colon) = compact.find(':') else {
        return true;
    };
    let scheme = &compact[..colon];
    if scheme.contains(|ch: char| matches!(ch, '/' | '?' | '#')) {
        return true;
    }
    matches!(
        scheme.to_ascii_lowercase().as_str(),
        "http" | "https" | "mailto"
    )
}

fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, raw);
    out
}

/// Full standalone page: rendered text on the left, image (if any) on the right.
pub fn render_page(result: &NormalizedResult) -> String {
    let body = render_markdown(&result.display_text);
    let image = result
        .image_url
        .as_deref()
        .filter(|url| is_safe_destination(url))
        .map(|url| {
            format!(
                "    <aside class=\"image\"><img src=\"{src}\" alt=\"Generated image\"></aside>\n",
                src = escape_text(url)
            )
        })
        .unwrap_or_default();
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "  <meta charset=\"utf-8\">\n",
            "  <title>Generated {kind} content</title>\n",
            "  <style>\n",
            "    main {{ display: flex; gap: 2rem; align-items: flex-start; }}\n",
            "    article {{ flex: 2; }}\n",
            "    aside.image {{ flex: 1; }}\n",
            "    aside.image img {{ max-width: 100%; }}\n",
            "  </style>\n",
            "</head>\n",
            "<body>\n",
            "  <h1 class=\"badge\">{kind}</h1>\n",
            "  <main>\n",
            "    <article>\n{body}    </article>\n",
            "{image}",
            "  </main>\n",
            "</body>\n",
            "</html>\n"
        ),
        kind = escape_text(&result.content_type),
        body = body,
        image = image,
    )
}

#[cfg(test)]
mod tests {
    use contentgen_contracts::NormalizedResult;

    use super::{is_safe_destination, render_markdown, render_page};

    #[test]
    fn renders_tables() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn renders_strikethrough_and_task_lists() {
        let html = render_markdown("~~gone~~\n\n- [x] done\n- [ ] todo\n");
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
        assert!(html.contains("checked"));
    }

    #[test]
    fn renders_emphasis_and_lists() {
        let html = render_markdown("**bold** and *soft*\n\n1. one\n2. two\n");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>soft</em>"));
        assert!(html.contains("<ol>"));
    }

    #[test]
    fn page_places_image_beside_text_and_escapes_attributes() {
        let result = NormalizedResult {
            display_text: "# Title".to_string(),
            image_url: Some("https://cdn.example.com/a.png?x=1&y=\"2\"".to_string()),
            content_type: "blog".to_string(),
        };
        let page = render_page(&result);
        assert!(page.contains("<h1>Title</h1>"));
        assert!(page.contains("<h1 class=\"badge\">blog</h1>"));
        assert!(page.contains("src=\"https://cdn.example.com/a.png?x=1&amp;y=&quot;2&quot;\""));
    }

    #[test]
    fn page_without_image_has_no_aside() {
        let result = NormalizedResult {
            display_text: "short post".to_string(),
            image_url: None,
            content_type: "x".to_string(),
        };
        let page = render_page(&result);
        assert!(!page.contains("<aside"));
        assert!(page.contains("<p>short post</p>"));
    }

    #[test]
    fn embedded_html_is_shown_as_text() {
        let result = NormalizedResult {
            display_text: "Hello <script>alert(1)</script>\n\n<img src=x onerror=alert(3)>\n"
                .to_string(),
            image_url: None,
            content_type: "blog".to_string(),
        };
        let page = render_page(&result);
        assert!(!page.contains("<script>"));
        assert!(!page.contains("<img src=x"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("&lt;img src=x onerror=alert(3)&gt;"));
    }

    #[test]
    fn script_links_and_images_lose_their_target() {
        let html = render_markdown(
            "[click](javascript:alert(2)) [tab](java\tscript:x) ![pic](data:image/png;base64,AA)",
        );
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("data:image"));
        assert!(html.contains("<a href=\"\">click</a>"));
        assert!(html.contains("<img src=\"\" alt=\"pic\""));
    }

    #[test]
    fn ordinary_links_survive() {
        let html = render_markdown(
            "[a](https://example.com/x) [b](mailto:hi@example.com) [c](/docs/a:b) [d](#top)",
        );
        assert!(html.contains("href=\"https://example.com/x\""));
        assert!(html.contains("href=\"mailto:hi@example.com\""));
        assert!(html.contains("href=\"/docs/a:b\""));
        assert!(html.contains("href=\"#top\""));
    }

    #[test]
    fn destination_schemes() {
        assert!(is_safe_destination("static/generated/a.png"));
        assert!(is_safe_destination("HTTPS://cdn.example.com/a.png"));
        assert!(!is_safe_destination("JavaScript:alert(1)"));
        assert!(!is_safe_destination(" java\nscript:alert(1)"));
        assert!(!is_safe_destination("vbscript:x"));
    }

    #[test]
    fn page_drops_image_with_script_source() {
        let result = NormalizedResult {
            display_text: "text".to_string(),
            image_url: Some("javascript:alert(1)".to_string()),
            content_type: "x".to_string(),
        };
        assert!(!render_page(&result).contains("<aside"));
    }
}
