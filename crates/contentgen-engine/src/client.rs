use contentgen_contracts::{error_detail, ContentType, GenerationRequest, GenerationResponse};
use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use serde_json::{json, Value};
use url::Url;

use crate::config::ClientConfig;
use crate::error::GenerationError;

/// Anything that can turn a validated request into a raw service response.
pub trait GenerationClient {
    fn name(&self) -> &str;

    fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError>;

    /// Turns an image reference from a response into something fetchable.
    fn resolve_asset_url(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Blocking client for the remote generation service.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    config: ClientConfig,
    http: HttpClient,
}

impl HttpGenerationClient {
    pub fn new(config: ClientConfig) -> Result<Self, GenerationError> {
        let http = HttpClient::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, http })
    }

    pub fn with_http(config: ClientConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

impl GenerationClient for HttpGenerationClient {
    fn name(&self) -> &str {
        "http"
    }

    fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let endpoint = self.config.endpoint(request.endpoint_path());
        let response = self.http.post(&endpoint).json(request).send()?;
        response_or_error(response)
    }

    fn resolve_asset_url(&self, raw: &str) -> String {
        if Url::parse(raw).is_ok() {
            return raw.to_string();
        }
        Url::parse(&format!("{}/", self.config.api_base))
            .and_then(|base| base.join(raw))
            .map(|joined| joined.to_string())
            .unwrap_or_else(|_| raw.to_string())
    }
}

fn response_or_error(response: HttpResponse) -> Result<GenerationResponse, GenerationError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(GenerationError::request(status.as_u16(), error_detail(&body)));
    }
    serde_json::from_str::<GenerationResponse>(&body)
        .map_err(|err| GenerationError::InvalidResponse(err.to_string()))
}

/// Offline stand-in that answers with canned channel content.
#[derive(Debug, Clone, Default)]
pub struct DryrunGenerationClient;

pub const DRYRUN_IMAGE_PATH: &str = "static/generated/dryrun-cover.png";

impl GenerationClient for DryrunGenerationClient {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let image_url = request.with_image().then(|| DRYRUN_IMAGE_PATH.to_string());
        let cover = image_url
            .as_deref()
            .map(|url| format!("![Cover image]({url})\n\n"))
            .unwrap_or_default();
        let body = match request.content_type {
            ContentType::Blog => format!(
                "```markdown\n{cover}# Notes on {url}\n\n| Point | Detail |\n|---|---|\n| Source | {url} |\n\n- [x] drafted\n- [ ] reviewed\n```",
                url = request.url
            ),
            ContentType::Newsletter => {
                format!("{cover}## This week\n\n- One link worth reading: {}\n", request.url)
            }
            ContentType::Linkedin | ContentType::Facebook => {
                format!("{cover}A quick take on {}. Thoughts welcome.", request.url)
            }
            ContentType::X => format!("{cover}Worth a read: {}", request.url),
        };
        let payload = json!({
            "url": request.url,
            "content_type": request.content_type.as_str(),
            "image_url": image_url,
            "content": {"raw": body, "tasks_output": Value::Array(Vec::new())},
        });
        serde_json::from_value(payload)
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use contentgen_contracts::{ContentPayload, RawForm};
    use serde_json::Value;

    use super::{DryrunGenerationClient, GenerationClient, HttpGenerationClient};
    use crate::config::ClientConfig;
    use crate::error::GenerationError;
    use crate::test_support::{local_http, request_body, serve_once};

    fn client_for(base: &str) -> anyhow::Result<HttpGenerationClient> {
        let config = ClientConfig::default().with_api_base(Some(base.to_string()));
        Ok(HttpGenerationClient::with_http(config, local_http()?))
    }

    #[test]
    fn posts_request_body_and_parses_success() -> anyhow::Result<()> {
        let (base, server) = serve_once(
            "200 OK",
            "application/json",
            r##"{"url":"https://example.com/","content_type":"blog","content":{"raw":"# Hi"}}"##,
        )?;
        let request = RawForm::new("https://example.com", "blog").validate()?;
        let response = client_for(&base)?.generate(&request)?;
        assert_eq!(response.content_type.as_deref(), Some("blog"));
        assert!(matches!(response.content, ContentPayload::StructuredPayload(_)));

        let raw_request = server.join().unwrap_or_default();
        assert!(raw_request.starts_with("POST /generate-content HTTP/1.1"));
        let sent: Value = serde_json::from_str(request_body(&raw_request))?;
        assert_eq!(sent["url"], "https://example.com/");
        assert_eq!(sent["content_type"], "blog");
        Ok(())
    }

    #[test]
    fn image_request_hits_image_endpoint() -> anyhow::Result<()> {
        let (base, server) = serve_once(
            "200 OK",
            "application/json",
            r#"{"content":"ok","image_url":"static/generated/a.png"}"#,
        )?;
        let mut form = RawForm::new("https://example.com", "x");
        form.with_image = true;
        let request = form.validate()?;
        let response = client_for(&base)?.generate(&request)?;
        assert_eq!(response.image_url(), Some("static/generated/a.png"));

        let raw_request = server.join().unwrap_or_default();
        assert!(raw_request.starts_with("POST /generate-content-with-image HTTP/1.1"));
        let sent: Value = serde_json::from_str(request_body(&raw_request))?;
        assert_eq!(sent["aspect_ratio"], "16:9");
        Ok(())
    }

    #[test]
    fn non_2xx_surfaces_detail_exactly() -> anyhow::Result<()> {
        let (base, _server) = serve_once(
            "429 Too Many Requests",
            "application/json",
            r#"{"detail": "quota exceeded"}"#,
        )?;
        let request = RawForm::new("https://example.com", "x").validate()?;
        let err = client_for(&base)?
            .generate(&request)
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected failure"))?;
        assert!(matches!(err, GenerationError::Request { status: 429, .. }));
        assert_eq!(err.to_string(), "quota exceeded");
        Ok(())
    }

    #[test]
    fn non_2xx_without_detail_uses_generic_message() -> anyhow::Result<()> {
        let (base, _server) = serve_once("502 Bad Gateway", "text/html", "<h1>bad gateway</h1>")?;
        let request = RawForm::new("https://example.com", "x").validate()?;
        let err = client_for(&base)?
            .generate(&request)
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected failure"))?;
        assert_eq!(err.to_string(), "Failed to generate content. Please try again.");
        Ok(())
    }

    #[test]
    fn non_json_success_is_invalid_response() -> anyhow::Result<()> {
        let (base, _server) = serve_once("200 OK", "text/plain", "hello")?;
        let request = RawForm::new("https://example.com", "x").validate()?;
        let err = client_for(&base)?.generate(&request).err();
        assert!(matches!(err, Some(GenerationError::InvalidResponse(_))));
        Ok(())
    }

    #[test]
    fn unreachable_service_is_network_error() -> anyhow::Result<()> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let base = format!("http://{}", listener.local_addr()?);
        drop(listener);
        let request = RawForm::new("https://example.com", "x").validate()?;
        let err = client_for(&base)?.generate(&request).err();
        assert!(matches!(err, Some(GenerationError::Network(_))));
        Ok(())
    }

    #[test]
    fn relative_image_paths_resolve_against_api_base() -> anyhow::Result<()> {
        let client = client_for("https://gen.example.com/api")?;
        assert_eq!(
            client.resolve_asset_url("static/generated/a.png"),
            "https://gen.example.com/api/static/generated/a.png"
        );
        assert_eq!(
            client.resolve_asset_url("/static/b.png"),
            "https://gen.example.com/static/b.png"
        );
        assert_eq!(
            client.resolve_asset_url("https://cdn.example.com/og.jpg"),
            "https://cdn.example.com/og.jpg"
        );
        Ok(())
    }

    #[test]
    fn dryrun_echoes_request_and_wraps_blog_in_fence() -> anyhow::Result<()> {
        let mut form = RawForm::new("https://example.com/post", "blog");
        form.with_image = true;
        let request = form.validate()?;
        let response = DryrunGenerationClient.generate(&request)?;
        assert_eq!(response.url.as_deref(), Some("https://example.com/post"));
        assert_eq!(response.image_url(), Some(super::DRYRUN_IMAGE_PATH));
        let ContentPayload::StructuredPayload(map) = response.content else {
            anyhow::bail!("dryrun content should be structured");
        };
        let raw = map.get("raw").and_then(Value::as_str).unwrap_or_default();
        assert!(raw.starts_with("```markdown\n![Cover image](static/generated/dryrun-cover.png)"));
        Ok(())
    }
}
