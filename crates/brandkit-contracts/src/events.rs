use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

/// Every line type a brandkit session writes to `events.jsonl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    SessionStarted,
    ViewChanged,
    ValidationNotice,
    GenerationStarted,
    /// One per loading tick while the provider call is outstanding.
    LoadingStatus,
    GenerationFailed,
    GenerationFinished,
    StyleGuideWritten,
    SessionFinished,
}

impl SessionEvent {
    pub const ALL: [SessionEvent; 9] = [
        SessionEvent::SessionStarted,
        SessionEvent::ViewChanged,
        SessionEvent::ValidationNotice,
        SessionEvent::GenerationStarted,
        SessionEvent::LoadingStatus,
        SessionEvent::GenerationFailed,
        SessionEvent::GenerationFinished,
        SessionEvent::StyleGuideWritten,
        SessionEvent::SessionFinished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionEvent::SessionStarted => "session_started",
            SessionEvent::ViewChanged => "view_changed",
            SessionEvent::ValidationNotice => "validation_notice",
            SessionEvent::GenerationStarted => "generation_started",
            SessionEvent::LoadingStatus => "loading_status",
            SessionEvent::GenerationFailed => "generation_failed",
            SessionEvent::GenerationFinished => "generation_finished",
            SessionEvent::StyleGuideWritten => "style_guide_written",
            SessionEvent::SessionFinished => "session_finished",
        }
    }
}

/// Append-only `events.jsonl` log for one session.
///
/// A line is `{type, session_id, ts}` plus the payload, which is merged last.
/// Clones share one lock, so the generation loop's tick callback and the
/// session loop never interleave partial lines.
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventWriterInner>,
}

#[derive(Debug)]
struct EventWriterInner {
    path: PathBuf,
    session_id: String,
    lock: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventWriterInner {
                path: path.into(),
                session_id: session_id.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn emit(&self, event: SessionEvent, payload: EventPayload) -> anyhow::Result<Value> {
        let mut line = Map::new();
        line.insert("type".to_string(), Value::from(event.as_str()));
        line.insert(
            "session_id".to_string(),
            Value::from(self.inner.session_id.as_str()),
        );
        line.insert("ts".to_string(), Value::from(now_utc_iso()));
        line.extend(payload);

        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let encoded = serde_json::to_string(&line)?;
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event log lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)
            .with_context(|| format!("opening {}", self.inner.path.display()))?;
        writeln!(file, "{encoded}")?;

        Ok(Value::Object(line))
    }
}

pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
