//! Content generation pipeline: request, normalize, sanitize, render.

pub mod client;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod media;
pub mod normalize;
pub mod notify;
pub mod render;
pub mod sanitize;
#[cfg(test)]
pub(crate) mod test_support;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use contentgen_contracts::events::{EventPayload, EventWriter};
use contentgen_contracts::{
    ContentType, FormSession, GenerationRequest, GenerationResponse, NormalizedResult, RawForm,
};
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Value};

pub use client::{DryrunGenerationClient, GenerationClient, HttpGenerationClient};
pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use config::ClientConfig;
pub use error::{ClipboardError, DownloadError, GenerationError};
pub use media::{derive_image_filename, SavedImage};
pub use normalize::normalize_content;
pub use notify::{NoticeLevel, Notification, Notifier, RecordingNotifier, StderrNotifier};
pub use render::{render_markdown, render_page};
pub use sanitize::{remove_image_markup, sanitize_content, strip_wrapping_fence};

/// Turns a raw response into the result the view keeps.
///
/// The echoed content type gates fence stripping when it parses; otherwise
/// the requested one does.
pub fn build_result(
    request: &GenerationRequest,
    response: &GenerationResponse,
    client: &dyn GenerationClient,
) -> NormalizedResult {
    let content_type = response
        .content_type
        .as_deref()
        .and_then(|raw| raw.parse::<ContentType>().ok())
        .unwrap_or(request.content_type);
    let display = normalize_content(&response.content);
    let image_url = response.image_url();
    NormalizedResult {
        display_text: sanitize_content(&display, content_type, image_url),
        image_url: image_url.map(|url| client.resolve_asset_url(url)),
        content_type: content_type.to_string(),
    }
}

/// Fresh id stamped on every event line of one session.
pub fn new_session_id() -> String {
    format!("session-{}", uuid::Uuid::new_v4().simple())
}

/// Drives one form: owns its submission state, reports every outcome as a
/// notification and an event line.
pub struct ContentEngine {
    client: Box<dyn GenerationClient>,
    downloads: HttpClient,
    session: FormSession,
    events: EventWriter,
    notifier: Box<dyn Notifier>,
}

impl ContentEngine {
    pub fn new(
        client: Box<dyn GenerationClient>,
        events: EventWriter,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        events.emit(
            "session_started",
            map_object(json!({ "client": client.name() })),
        )?;
        Ok(Self {
            client,
            downloads: HttpClient::new(),
            session: FormSession::new(),
            events,
            notifier,
        })
    }

    pub fn with_download_client(mut self, http: HttpClient) -> Self {
        self.downloads = http;
        self
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn result(&self) -> Option<&NormalizedResult> {
        self.session.result()
    }

    pub fn event_writer(&self) -> EventWriter {
        self.events.clone()
    }

    /// Validates and moves the session to `Submitting`.
    ///
    /// Field errors leave the session idle and send nothing.
    pub fn prepare(&mut self, form: &RawForm) -> Result<GenerationRequest, GenerationError> {
        self.session.ensure_idle()?;
        let request = match form.validate() {
            Ok(request) => request,
            Err(errors) => {
                let fields = errors
                    .errors()
                    .iter()
                    .map(|error| json!({"field": error.field, "message": error.message}))
                    .collect::<Vec<Value>>();
                self.log("validation_failed", json!({ "errors": fields }));
                return Err(errors.into());
            }
        };
        self.session.begin()?;
        self.log(
            "submission_started",
            json!({
                "url": request.url,
                "content_type": request.content_type.as_str(),
                "with_image": request.with_image(),
            }),
        );
        Ok(request)
    }

    /// Records the outcome of the in-flight request.
    pub fn complete(
        &mut self,
        request: &GenerationRequest,
        outcome: Result<GenerationResponse, GenerationError>,
    ) -> Result<&NormalizedResult, GenerationError> {
        match outcome {
            Ok(response) => {
                let result = build_result(request, &response, self.client.as_ref());
                let summary = json!({
                    "content_type": result.content_type,
                    "chars": result.display_text.chars().count(),
                    "image_url": result.image_url,
                });
                self.session.succeed(result)?;
                self.log("submission_succeeded", summary);
                self.notifier.notify(&Notification::success(
                    "Content generated",
                    format!("Your {} content is ready.", request.content_type),
                ));
                self.session
                    .result()
                    .ok_or_else(|| GenerationError::InvalidResponse("result missing".to_string()))
            }
            Err(err) => {
                let message = err.to_string();
                self.session.fail(message.clone())?;
                self.log(
                    "submission_failed",
                    json!({ "kind": err.kind(), "message": message }),
                );
                self.notifier
                    .notify(&Notification::error("Generation failed", message));
                Err(err)
            }
        }
    }

    /// One full submission: validate, call the service, keep the result.
    pub fn submit(&mut self, form: &RawForm) -> Result<&NormalizedResult, GenerationError> {
        let request = self.prepare(form)?;
        let outcome = self.client.generate(&request);
        self.complete(&request, outcome)
    }

    /// "New generation": back to idle, previous result dropped.
    pub fn reset(&mut self) {
        self.session.reset();
        self.log("session_reset", json!({}));
    }

    pub fn copy_result(&self, clipboard: &mut dyn Clipboard) -> Result<(), ClipboardError> {
        let outcome = match self.session.result() {
            Some(result) => clipboard.set_text(&result.display_text),
            None => Err(ClipboardError("nothing to copy yet".to_string())),
        };
        match &outcome {
            Ok(()) => {
                self.log("clipboard_copied", json!({}));
                self.notifier.notify(&Notification::success(
                    "Copied",
                    "Content copied to clipboard.",
                ));
            }
            Err(err) => {
                self.log("clipboard_failed", json!({ "message": err.to_string() }));
                self.notifier
                    .notify(&Notification::error("Copy failed", err.to_string()));
            }
        }
        outcome
    }

    pub fn download_image(&self, dir: &Path) -> Result<SavedImage, DownloadError> {
        let outcome = match self
            .session
            .result()
            .and_then(|result| result.image_url.as_deref())
        {
            Some(url) => media::download_image(&self.downloads, url, dir),
            None => Err(DownloadError::NoImage),
        };
        match &outcome {
            Ok(saved) => {
                self.log(
                    "image_downloaded",
                    json!({
                        "path": saved.path.to_string_lossy(),
                        "media_type": saved.media_type,
                        "bytes": saved.bytes,
                    }),
                );
                self.notifier.notify(&Notification::success(
                    "Image downloaded",
                    format!("Saved {}", saved.path.display()),
                ));
            }
            Err(err) => {
                self.log("image_download_failed", json!({ "message": err.to_string() }));
                self.notifier
                    .notify(&Notification::error("Download failed", err.to_string()));
            }
        }
        outcome
    }

    pub fn render_page(&self) -> Option<String> {
        self.session.result().map(render_page)
    }

    pub fn write_page(&self, path: &Path) -> Result<()> {
        let page = self
            .render_page()
            .context("no generated content to render")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, page).with_context(|| format!("failed writing {}", path.display()))?;
        self.log(
            "page_written",
            json!({ "path": path.to_string_lossy() }),
        );
        Ok(())
    }

    fn log(&self, event_type: &str, payload: Value) {
        if let Err(err) = self.events.emit(event_type, map_object(payload)) {
            eprintln!("contentgen: event log write failed: {err:#}");
        }
    }
}

fn map_object(value: Value) -> EventPayload {
    value.as_object().cloned().unwrap_or_default()
}
