use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

/// Session log: one compact JSON object per line.
///
/// Every line starts with `type`, `session_id` and `ts`; caller keys are
/// merged afterwards and win on collision. Clones share the same sink.
#[derive(Debug, Clone)]
pub struct EventWriter {
    session_id: Arc<str>,
    sink: Arc<Sink>,
}

#[derive(Debug)]
enum Sink {
    Jsonl {
        path: PathBuf,
        // Opened on first emit.
        file: Mutex<Option<File>>,
    },
    Discard,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self::with_sink(
            Sink::Jsonl {
                path: path.into(),
                file: Mutex::new(None),
            },
            session_id.into(),
        )
    }

    /// Builds events without writing them anywhere.
    pub fn discard(session_id: impl Into<String>) -> Self {
        Self::with_sink(Sink::Discard, session_id.into())
    }

    fn with_sink(sink: Sink, session_id: String) -> Self {
        Self {
            session_id: session_id.into(),
            sink: Arc::new(sink),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self.sink.as_ref() {
            Sink::Jsonl { path, .. } => Some(path),
            Sink::Discard => None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn emit(&self, event_type: &str, payload: EventPayload) -> anyhow::Result<Value> {
        let mut event = EventPayload::new();
        event.insert("type".to_string(), Value::from(event_type));
        event.insert("session_id".to_string(), Value::from(self.session_id()));
        event.insert(
            "ts".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        event.extend(payload);
        let event = Value::Object(event);

        if let Sink::Jsonl { path, file } = self.sink.as_ref() {
            append_line(path, file, &event)
                .with_context(|| format!("failed appending event to {}", path.display()))?;
        }
        Ok(event)
    }
}

fn append_line(path: &Path, slot: &Mutex<Option<File>>, event: &Value) -> anyhow::Result<()> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');

    let mut slot = slot
        .lock()
        .map_err(|_| anyhow::anyhow!("event log lock poisoned"))?;
    let mut file = match slot.take() {
        Some(file) => file,
        None => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            OpenOptions::new().create(true).append(true).open(path)?
        }
    };
    let written = file.write_all(&line);
    *slot = Some(file);
    Ok(written?)
}

/// Reads a session log back, skipping blank lines.
pub fn read_events(path: &Path) -> anyhow::Result<Vec<Value>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{} line {}", path.display(), index + 1))
        })
        .collect()
}
