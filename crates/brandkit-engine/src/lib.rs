use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use brandkit_contracts::brand::{AiResult, GenerationOutcome};
use brandkit_contracts::catalog::FONT_CATALOG;
use brandkit_contracts::events::{EventPayload, EventWriter, SessionEvent};
use brandkit_contracts::form::FormInput;
use brandkit_contracts::models::{ModelRegistry, ModelSelector, STRUCTURED_JSON};
use brandkit_contracts::prompt::{build_prompt, response_schema, SchemaDialect, SCHEMA_NAME};
use brandkit_contracts::runs::{
    build_receipt, write_receipt, write_summary, GenerationRequest, SessionSummary,
};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response as HttpResponse};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const DEFAULT_MIN_WAIT_MS: u64 = 3000;
pub const DEFAULT_TICK_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_S: f64 = 60.0;
const DEFAULT_TRANSPORT_RETRIES: f64 = 1.0;
const RETRY_BACKOFF: Duration = Duration::from_millis(750);
const ERROR_TEXT_LIMIT: usize = 512;

const SYSTEM_INSTRUCTION: &str = "You are a senior brand strategist. Answer with JSON only. \
     Treat any user constraint marked ABSOLUTE as non-negotiable.";

/// Timing knobs for one generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub min_wait: Duration,
    pub tick: Duration,
    pub request_timeout: Duration,
    pub transport_retries: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl GenerationSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(non_empty_env)
    }

    /// Reads every knob through `lookup`, clamping each to its allowed range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, default: f64, min: f64, max: f64| {
            value_as_f64(lookup(key).as_deref(), default, min, max)
        };
        Self {
            min_wait: Duration::from_millis(
                read("BRANDKIT_MIN_WAIT_MS", DEFAULT_MIN_WAIT_MS as f64, 0.0, 60_000.0) as u64,
            ),
            tick: Duration::from_millis(
                read("BRANDKIT_TICK_MS", DEFAULT_TICK_MS as f64, 50.0, 10_000.0) as u64,
            ),
            request_timeout: Duration::from_secs_f64(read(
                "BRANDKIT_REQUEST_TIMEOUT_S",
                DEFAULT_REQUEST_TIMEOUT_S,
                5.0,
                300.0,
            )),
            transport_retries: read(
                "BRANDKIT_TRANSPORT_RETRIES",
                DEFAULT_TRANSPORT_RETRIES,
                0.0,
                4.0,
            ) as usize,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextRequest {
    pub prompt: String,
    pub model: String,
    pub timeout: Duration,
    pub transport_retries: usize,
}

#[derive(Debug, Clone)]
pub struct TextResponse {
    pub provider_request: Map<String, Value>,
    pub provider_response: Map<String, Value>,
    pub warnings: Vec<String>,
    /// The completion decoded as JSON.
    pub payload: Value,
}

pub trait TextProvider: Send + Sync {
    fn name(&self) -> &str;
    fn complete(&self, request: &TextRequest) -> Result<TextResponse>;
}

#[derive(Default, Clone)]
pub struct TextProviderRegistry {
    providers: BTreeMap<String, Arc<dyn TextProvider>>,
}

impl TextProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: TextProvider + 'static>(&mut self, provider: P) {
        self.providers
            .insert(provider.name().to_string(), Arc::new(provider));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TextProvider>> {
        self.providers.get(name).cloned()
    }
}

pub fn default_provider_registry() -> TextProviderRegistry {
    let mut providers = TextProviderRegistry::new();
    providers.register(DryrunProvider);
    providers.register(OpenAiProvider::new());
    providers.register(GeminiProvider::new());
    providers
}

/// Offline provider: answers with JSON derived from a hash of the prompt.
pub struct DryrunProvider;

impl TextProvider for DryrunProvider {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn complete(&self, request: &TextRequest) -> Result<TextResponse> {
        let digest = Sha256::digest(request.prompt.as_bytes());
        let color = |offset: usize| format!("#{}", hex::encode_upper(&digest[offset..offset + 3]));
        let font = |offset: usize| FONT_CATALOG[digest[offset] as usize % FONT_CATALOG.len()];
        let tag = hex::encode(&digest[..4]);

        let payload = json!({
            "strategy": {
                "en": format!("Identity study {tag}: lead with clarity, let the palette carry the mood."),
                "ko": format!("아이덴티티 스터디 {tag}: 명료함을 앞세우고 분위기는 컬러로 전달합니다."),
            },
            "slogan": { "en": "Made to be remembered.", "ko": "기억에 남도록." },
            "primaryColor": color(4),
            "secondaryColor": color(7),
            "accentColor": color(10),
            "primaryFont": font(13),
            "secondaryFont": font(14),
        });

        Ok(TextResponse {
            provider_request: map_object(json!({
                "endpoint": "dryrun-native",
                "payload": {
                    "model": request.model,
                    "prompt": request.prompt,
                },
            })),
            provider_response: map_object(json!({
                "status": "ok",
                "model": request.model,
            })),
            warnings: Vec::new(),
            payload,
        })
    }
}

/// OpenAI-compatible chat completions with a strict JSON schema.
pub struct OpenAiProvider {
    api_base: String,
    http: HttpClient,
}

impl OpenAiProvider {
    pub fn new() -> Self {
        Self {
            api_base: api_base_from_env("OPENAI_API_BASE", "https://api.openai.com/v1"),
            http: HttpClient::new(),
        }
    }

    fn api_key() -> Option<String> {
        non_empty_env("OPENAI_API_KEY")
    }

    fn build_payload(request: &TextRequest) -> Value {
        json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user", "content": request.prompt },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": response_schema(SchemaDialect::JsonSchema),
                },
            },
        })
    }

    fn extract_text(response_payload: &Value) -> Result<String> {
        let message = response_payload
            .pointer("/choices/0/message")
            .context("OpenAI response has no choices")?;
        if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
            bail!("OpenAI refused the request: {}", truncate_text(refusal, 200));
        }
        message
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("OpenAI response message has no content")
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete(&self, request: &TextRequest) -> Result<TextResponse> {
        let Some(api_key) = Self::api_key() else {
            bail!("OPENAI_API_KEY is not set");
        };
        let endpoint = format!("{}/chat/completions", self.api_base);
        let payload = Self::build_payload(request);
        let mut warnings = Vec::new();

        let response = post_with_transport_retries(
            "OpenAI",
            &endpoint,
            request,
            &mut warnings,
            || self.http.post(&endpoint).bearer_auth(&api_key).json(&payload),
        )?;
        let status_code = response.status().as_u16();
        let response_payload = response_json_or_error("OpenAI", response)?;
        let text = Self::extract_text(&response_payload)?;

        Ok(TextResponse {
            provider_request: map_object(json!({
                "endpoint": endpoint,
                "payload": payload,
            })),
            provider_response: map_object(json!({
                "status_code": status_code,
                "id": response_payload.get("id").cloned().unwrap_or(Value::Null),
                "usage": response_payload.get("usage").cloned().unwrap_or(Value::Null),
            })),
            warnings,
            payload: parse_json_text("OpenAI", &text)?,
        })
    }
}

/// Gemini `generateContent` with `responseSchema`.
pub struct GeminiProvider {
    api_base: String,
    http: HttpClient,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self {
            api_base: api_base_from_env(
                "GEMINI_API_BASE",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            http: HttpClient::new(),
        }
    }

    fn api_key() -> Option<String> {
        non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"))
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn build_payload(request: &TextRequest) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(SchemaDialect::Gemini),
            },
        })
    }

    fn extract_text(response_payload: &Value) -> Result<String> {
        let candidate = response_payload
            .pointer("/candidates/0")
            .context("Gemini response has no candidates")?;
        let text: String = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        if text.trim().is_empty() {
            let reason = candidate
                .get("finishReason")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            bail!("Gemini returned no text (finishReason: {reason})");
        }
        Ok(text)
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn complete(&self, request: &TextRequest) -> Result<TextResponse> {
        let Some(api_key) = Self::api_key() else {
            bail!("GEMINI_API_KEY or GOOGLE_API_KEY is not set");
        };
        let endpoint = self.endpoint_for_model(&request.model);
        let payload = Self::build_payload(request);
        let mut warnings = Vec::new();

        let response = post_with_transport_retries(
            "Gemini",
            &endpoint,
            request,
            &mut warnings,
            || {
                self.http
                    .post(&endpoint)
                    .header("x-goog-api-key", &api_key)
                    .json(&payload)
            },
        )?;
        let status_code = response.status().as_u16();
        let response_payload = response_json_or_error("Gemini", response)?;
        let text = Self::extract_text(&response_payload)?;

        Ok(TextResponse {
            provider_request: map_object(json!({
                "endpoint": endpoint,
                "payload": payload,
            })),
            provider_response: map_object(json!({
                "status_code": status_code,
                "model_version": response_payload.get("modelVersion").cloned().unwrap_or(Value::Null),
                "usage": response_payload.get("usageMetadata").cloned().unwrap_or(Value::Null),
            })),
            warnings,
            payload: parse_json_text("Gemini", &text)?,
        })
    }
}

/// Drives generation attempts for one session and owns its run directory.
pub struct BrandEngine {
    run_dir: PathBuf,
    session_id: String,
    events: EventWriter,
    summary_path: PathBuf,
    started_at: DateTime<Utc>,
    model_selector: ModelSelector,
    text_model: Option<String>,
    providers: TextProviderRegistry,
    settings: GenerationSettings,
    generations: u64,
    failed_generations: u64,
    exports: Vec<String>,
}

impl BrandEngine {
    pub fn new(
        run_dir: impl Into<PathBuf>,
        events_path: impl Into<PathBuf>,
        text_model: Option<String>,
    ) -> Result<Self> {
        let run_dir = run_dir.into();
        std::fs::create_dir_all(&run_dir)
            .with_context(|| format!("creating run dir {}", run_dir.display()))?;
        let session_id = run_dir
            .file_name()
            .and_then(|value| value.to_str())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("session-{}", Uuid::new_v4()));
        let events = EventWriter::new(events_path.into(), session_id.clone());
        let summary_path = run_dir.join("summary.json");

        events.emit(
            SessionEvent::SessionStarted,
            map_object(json!({
                "out_dir": run_dir.to_string_lossy().to_string(),
                "text_model": text_model,
            })),
        )?;

        Ok(Self {
            run_dir,
            session_id,
            events,
            summary_path,
            started_at: Utc::now(),
            model_selector: ModelSelector::new(None),
            text_model,
            providers: default_provider_registry(),
            settings: GenerationSettings::from_env(),
            generations: 0,
            failed_generations: 0,
            exports: Vec::new(),
        })
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Swaps the model table and the providers behind it.
    pub fn with_backends(mut self, models: ModelRegistry, providers: TextProviderRegistry) -> Self {
        self.model_selector = ModelSelector::new(Some(models));
        self.providers = providers;
        self
    }

    pub fn emit_event(&self, event: SessionEvent, payload: EventPayload) -> Result<Value> {
        self.events.emit(event, payload)
    }

    /// Notes a written file for `summary.json`; re-exports are listed once.
    pub fn record_export(&mut self, path: &Path) {
        let path = path.to_string_lossy().to_string();
        if !self.exports.contains(&path) {
            self.exports.push(path);
        }
    }

    /// Runs one generation attempt for `input`.
    ///
    /// The provider call runs on a worker thread while this thread calls
    /// `on_tick` once per tick. Returns no sooner than the configured
    /// minimum wait. Provider failures never surface as `Err`; they come back
    /// as a degraded outcome. `Err` is reserved for event/receipt IO.
    pub fn generate(
        &mut self,
        input: &FormInput,
        mut on_tick: impl FnMut(u64),
    ) -> Result<GenerationOutcome> {
        self.generations += 1;
        let attempt_id = Uuid::new_v4().to_string();
        let prompt = build_prompt(input);
        let started = Instant::now();

        let selection = self
            .model_selector
            .select(self.text_model.as_deref(), STRUCTURED_JSON);
        let (model, provider_name, fallback_reason) = match &selection {
            Ok(selection) => (
                selection.model.name.clone(),
                selection.model.provider.clone(),
                selection.fallback_reason.clone(),
            ),
            Err(_) => (String::new(), String::new(), None),
        };

        self.events.emit(
            SessionEvent::GenerationStarted,
            map_object(json!({
                "attempt_id": attempt_id,
                "model": model,
                "provider": provider_name,
                "fallback_reason": fallback_reason,
                "min_wait_ms": self.settings.min_wait.as_millis() as u64,
            })),
        )?;

        let request = TextRequest {
            prompt: prompt.clone(),
            model: model.clone(),
            timeout: self.settings.request_timeout,
            transport_retries: self.settings.transport_retries,
        };
        let call: Result<Arc<dyn TextProvider>> = match selection {
            Ok(_) => self
                .providers
                .get(&provider_name)
                .ok_or_else(|| anyhow!("no provider registered for '{provider_name}'")),
            Err(message) => Err(anyhow!(message)),
        };

        let result = match call {
            Ok(provider) => {
                let events = self.events.clone();
                let attempt = attempt_id.clone();
                let mut tick = |count: u64| -> Result<()> {
                    on_tick(count);
                    events.emit(
                        SessionEvent::LoadingStatus,
                        map_object(json!({ "attempt_id": attempt, "tick": count })),
                    )?;
                    Ok(())
                };
                wait_for_completion(provider, request, &self.settings, started, &mut tick)?
            }
            Err(err) => {
                let mut tick = |count: u64| -> Result<()> {
                    on_tick(count);
                    Ok(())
                };
                hold_minimum(&self.settings, started, &mut tick)?;
                Err(err)
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (outcome, provider_request, provider_response, warnings) = match result {
            Ok(response) => match AiResult::from_value(&response.payload) {
                Some(ai) => {
                    let mut warnings = response.warnings;
                    if ai.is_empty() {
                        push_unique_warning(
                            &mut warnings,
                            "Completion carried no usable fields; using derived assets.".to_string(),
                        );
                    }
                    (
                        GenerationOutcome::succeeded(input, ai, elapsed_ms),
                        response.provider_request,
                        response.provider_response,
                        warnings,
                    )
                }
                None => (
                    GenerationOutcome::failed("completion was not a JSON object", elapsed_ms),
                    response.provider_request,
                    response.provider_response,
                    response.warnings,
                ),
            },
            Err(err) => (
                GenerationOutcome::failed(error_chain_text(&err, ERROR_TEXT_LIMIT), elapsed_ms),
                Map::new(),
                Map::new(),
                Vec::new(),
            ),
        };

        if let Some(error) = outcome.error.as_deref() {
            self.failed_generations += 1;
            self.events.emit(
                SessionEvent::GenerationFailed,
                map_object(json!({ "attempt_id": attempt_id, "error": error })),
            )?;
        }

        let receipt_path = self
            .run_dir
            .join(format!("receipt-{}.json", self.generations));
        let receipt = build_receipt(
            &GenerationRequest {
                input: input.clone(),
                prompt,
                provider: provider_name,
                model,
                requested_model: self.text_model.clone(),
                fallback_reason,
            },
            &provider_request,
            &provider_response,
            &warnings,
            &outcome,
            &receipt_path,
        );
        write_receipt(&receipt_path, &receipt)?;

        self.events.emit(
            SessionEvent::GenerationFinished,
            map_object(json!({
                "attempt_id": attempt_id,
                "elapsed_ms": outcome.elapsed_ms,
                "degraded": outcome.is_degraded(),
                "warnings": warnings,
                "receipt_path": receipt_path.to_string_lossy().to_string(),
            })),
        )?;
        Ok(outcome)
    }

    pub fn finish(&mut self, final_view: &str) -> Result<()> {
        let summary = SessionSummary {
            session_id: self.session_id.clone(),
            started_at: format_ts(self.started_at),
            finished_at: format_ts(Utc::now()),
            generations: self.generations,
            failed_generations: self.failed_generations,
            final_view: final_view.to_string(),
            exports: self.exports.clone(),
        };
        write_summary(&self.summary_path, &summary, None)?;
        self.events.emit(
            SessionEvent::SessionFinished,
            map_object(json!({
                "summary_path": self.summary_path.to_string_lossy().to_string()
            })),
        )?;
        Ok(())
    }
}

/// Runs `provider` on a worker thread and ticks until it has answered and
/// `min_wait` has passed since `started`.
fn wait_for_completion(
    provider: Arc<dyn TextProvider>,
    request: TextRequest,
    settings: &GenerationSettings,
    started: Instant,
    on_tick: &mut dyn FnMut(u64) -> Result<()>,
) -> Result<Result<TextResponse>> {
    let (tx, rx) = mpsc::channel();
    let worker = thread::spawn(move || {
        let _ = tx.send(provider.complete(&request));
    });

    let ready_at = started + settings.min_wait;
    let mut next_tick = started + settings.tick;
    let mut ticks = 0u64;
    let mut settled: Option<Result<TextResponse>> = None;

    loop {
        let now = Instant::now();
        if settled.is_some() && now >= ready_at {
            break;
        }
        if settled.is_none() {
            match rx.recv_timeout(next_tick.saturating_duration_since(now)) {
                Ok(result) => {
                    settled = Some(result);
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    settled = Some(Err(anyhow!("generation worker exited without a result")));
                    continue;
                }
            }
        } else {
            thread::sleep(next_tick.min(ready_at).saturating_duration_since(now));
        }
        let now = Instant::now();
        if settled.is_some() && now >= ready_at {
            break;
        }
        if now >= next_tick {
            ticks += 1;
            if let Err(err) = on_tick(ticks) {
                let _ = worker.join();
                return Err(err);
            }
            next_tick += settings.tick;
        }
    }

    let _ = worker.join();
    Ok(settled.unwrap_or_else(|| Err(anyhow!("generation did not settle"))))
}

/// Ticks until `min_wait` has passed; used when no provider call is made.
fn hold_minimum(
    settings: &GenerationSettings,
    started: Instant,
    on_tick: &mut dyn FnMut(u64) -> Result<()>,
) -> Result<()> {
    let ready_at = started + settings.min_wait;
    let mut next_tick = started + settings.tick;
    let mut ticks = 0u64;
    loop {
        let now = Instant::now();
        if now >= ready_at {
            return Ok(());
        }
        thread::sleep(next_tick.min(ready_at).saturating_duration_since(now));
        let now = Instant::now();
        if now < ready_at && now >= next_tick {
            ticks += 1;
            on_tick(ticks)?;
            next_tick += settings.tick;
        }
    }
}

fn post_with_transport_retries(
    provider: &str,
    endpoint: &str,
    request: &TextRequest,
    warnings: &mut Vec<String>,
    build: impl Fn() -> RequestBuilder,
) -> Result<HttpResponse> {
    let mut attempt = 0;
    loop {
        match build().timeout(request.timeout).send() {
            Ok(response) => return Ok(response),
            Err(raw) => {
                let err = anyhow::Error::new(raw)
                    .context(format!("{provider} request failed ({endpoint})"));
                if !is_retryable_transport_error(&err) || attempt >= request.transport_retries {
                    return Err(err);
                }
                attempt += 1;
                push_unique_warning(
                    warnings,
                    format!(
                        "{provider} transport retry {attempt}/{} after transient request failure.",
                        request.transport_retries
                    ),
                );
                thread::sleep(RETRY_BACKOFF * attempt as u32);
            }
        }
    }
}

fn response_json_or_error(provider: &str, response: HttpResponse) -> Result<Value> {
    let status = response.status();
    let code = status.as_u16();
    let body = response
        .text()
        .with_context(|| format!("{provider} response body read failed"))?;
    if !status.is_success() {
        bail!(
            "{provider} request failed ({code}): {}",
            truncate_text(&body, ERROR_TEXT_LIMIT)
        );
    }
    serde_json::from_str(&body).with_context(|| format!("{provider} returned invalid JSON payload"))
}

/// Decodes completion text as JSON, tolerating a surrounding code fence.
fn parse_json_text(provider: &str, text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim()).with_context(|| {
        format!(
            "{provider} completion is not valid JSON: {}",
            truncate_text(trimmed, 200)
        )
    })
}

fn is_retryable_transport_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .map(|reqwest_err| reqwest_err.is_timeout() || reqwest_err.is_connect())
            .unwrap_or(false)
    })
}

fn error_chain_text(err: &anyhow::Error, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() || parts.last().is_some_and(|existing| existing == trimmed) {
            continue;
        }
        parts.push(trimmed.to_string());
    }
    if parts.is_empty() {
        return truncate_text(&err.to_string(), max_chars);
    }
    truncate_text(&parts.join(" | caused by: "), max_chars)
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

fn push_unique_warning(warnings: &mut Vec<String>, message: String) {
    if message.trim().is_empty() || warnings.contains(&message) {
        return;
    }
    warnings.push(message);
}

fn value_as_f64(raw: Option<&str>, default: f64, min: f64, max: f64) -> f64 {
    raw.and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
        .clamp(min, max)
}

fn api_base_from_env(key: &str, default: &str) -> String {
    non_empty_env(key)
        .map(|value| value.trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn map_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use brandkit_contracts::catalog::{Industry, Tone, Touchpoint};
    use brandkit_contracts::models::ModelSpec;

    use super::*;

    struct ScriptedProvider {
        delay: Duration,
        reply: std::result::Result<Value, String>,
    }

    impl TextProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete(&self, _request: &TextRequest) -> Result<TextResponse> {
            thread::sleep(self.delay);
            match &self.reply {
                Ok(payload) => Ok(TextResponse {
                    provider_request: Map::new(),
                    provider_response: Map::new(),
                    warnings: Vec::new(),
                    payload: payload.clone(),
                }),
                Err(message) => Err(anyhow!(message.clone())),
            }
        }
    }

    fn sample_input() -> FormInput {
        FormInput {
            brand_name: "Harbor".to_string(),
            industry: Some(Industry::Finance),
            touchpoint: Some(Touchpoint::Website),
            selected_tones: vec![Tone::Calm, Tone::Trustworthy],
            negative_preference: "no gold".to_string(),
        }
    }

    fn fast_settings(min_wait_ms: u64, tick_ms: u64) -> GenerationSettings {
        GenerationSettings {
            min_wait: Duration::from_millis(min_wait_ms),
            tick: Duration::from_millis(tick_ms),
            request_timeout: Duration::from_secs(5),
            transport_retries: 0,
        }
    }

    fn scripted_engine(
        run_dir: &Path,
        settings: GenerationSettings,
        provider: ScriptedProvider,
    ) -> Result<BrandEngine> {
        let mut providers = TextProviderRegistry::new();
        providers.register(provider);
        let models =
            ModelRegistry::from_specs([ModelSpec::new("scripted-1", "scripted", &[STRUCTURED_JSON], None)]);
        Ok(
            BrandEngine::new(run_dir, run_dir.join("events.jsonl"), Some("scripted-1".to_string()))?
                .with_settings(settings)
                .with_backends(models, providers),
        )
    }

    fn event_types(path: &Path) -> Result<Vec<String>> {
        let raw = fs::read_to_string(path)?;
        Ok(raw
            .lines()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter_map(|row| row.get("type").and_then(Value::as_str).map(str::to_string))
            .collect())
    }

    #[test]
    fn fast_answer_still_waits_for_minimum() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let run_dir = temp.path().join("run");
        let mut engine = BrandEngine::new(&run_dir, run_dir.join("events.jsonl"), Some("dryrun-text-1".to_string()))?
            .with_settings(fast_settings(300, 100));

        let mut ticks = Vec::new();
        let outcome = engine.generate(&sample_input(), |tick| ticks.push(tick))?;

        assert!(outcome.elapsed_ms >= 300, "{}", outcome.elapsed_ms);
        assert!(!outcome.is_degraded());
        assert!(outcome.ai.as_ref().is_some_and(|ai| ai.primary_color.is_some()));
        assert!(ticks.len() >= 2, "{ticks:?}");
        assert_eq!(ticks[0], 1);
        assert!(run_dir.join("receipt-1.json").exists());
        Ok(())
    }

    #[test]
    fn slow_answer_gets_no_extra_delay() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut engine = scripted_engine(
            temp.path(),
            fast_settings(50, 50),
            ScriptedProvider {
                delay: Duration::from_millis(400),
                reply: Ok(json!({ "slogan": { "en": "Steady.", "ko": "꾸준히." } })),
            },
        )?;

        let mut ticks = 0u64;
        let outcome = engine.generate(&sample_input(), |_| ticks += 1)?;

        assert!(outcome.elapsed_ms >= 400);
        assert!(outcome.elapsed_ms < 2000, "{}", outcome.elapsed_ms);
        assert!(ticks >= 4);
        assert!(ticks <= outcome.elapsed_ms / 50 + 1, "{ticks} ticks in {}ms", outcome.elapsed_ms);
        let ai = outcome.ai.as_ref().map(|ai| ai.slogan.clone());
        assert_eq!(ai, Some(Some(brandkit_contracts::i18n::Bilingual::new("Steady.", "꾸준히."))));
        Ok(())
    }

    #[test]
    fn ticking_stops_once_settled_and_minimum_elapsed() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut engine = scripted_engine(
            temp.path(),
            fast_settings(200, 50),
            ScriptedProvider {
                delay: Duration::ZERO,
                reply: Ok(json!({})),
            },
        )?;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        engine.generate(&sample_input(), move |tick| {
            if let Ok(mut ticks) = recorder.lock() {
                ticks.push((tick, Instant::now()));
            }
        })?;
        let returned = Instant::now();
        thread::sleep(Duration::from_millis(200));

        let ticks = seen.lock().map(|ticks| ticks.clone()).unwrap_or_default();
        assert!(!ticks.is_empty());
        assert!(ticks.len() <= 4, "{ticks:?}");
        assert!(ticks.iter().all(|(_, at)| *at <= returned));
        let numbers: Vec<u64> = ticks.iter().map(|(tick, _)| *tick).collect();
        assert_eq!(numbers, (1..=ticks.len() as u64).collect::<Vec<_>>());

        let loading = event_types(&temp.path().join("events.jsonl"))?
            .into_iter()
            .filter(|kind| kind == "loading_status")
            .count();
        assert_eq!(loading, ticks.len());
        Ok(())
    }

    #[test]
    fn failing_tick_joins_the_worker_first() {
        struct FlagProvider {
            done: Arc<AtomicBool>,
        }

        impl TextProvider for FlagProvider {
            fn name(&self) -> &str {
                "flag"
            }

            fn complete(&self, _request: &TextRequest) -> Result<TextResponse> {
                thread::sleep(Duration::from_millis(150));
                self.done.store(true, Ordering::SeqCst);
                bail!("late")
            }
        }

        let done = Arc::new(AtomicBool::new(false));
        let request = TextRequest {
            prompt: String::new(),
            model: "flag-1".to_string(),
            timeout: Duration::from_secs(1),
            transport_retries: 0,
        };
        let result = wait_for_completion(
            Arc::new(FlagProvider {
                done: Arc::clone(&done),
            }),
            request,
            &fast_settings(500, 20),
            Instant::now(),
            &mut |_: u64| -> Result<()> { bail!("event log unavailable") },
        );

        assert!(result.is_err());
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn repeated_exports_are_listed_once() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut engine = BrandEngine::new(temp.path(), temp.path().join("events.jsonl"), None)?;
        let guide = temp.path().join("style-guide.html");
        engine.record_export(&guide);
        engine.record_export(&guide);
        engine.record_export(&temp.path().join("palette.png"));
        engine.finish("result")?;

        let summary: Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join("summary.json"))?)?;
        assert_eq!(summary["exports"].as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[test]
    fn provider_failure_becomes_degraded_outcome() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut engine = scripted_engine(
            temp.path(),
            fast_settings(100, 40),
            ScriptedProvider {
                delay: Duration::from_millis(10),
                reply: Err("upstream exploded".to_string()),
            },
        )?;

        let outcome = engine.generate(&sample_input(), |_| {})?;
        assert!(outcome.is_degraded());
        assert!(outcome.ai.is_none());
        assert!(outcome.elapsed_ms >= 100);
        assert_eq!(
            outcome.strategy,
            brandkit_contracts::brand::generation_failure_message()
        );
        assert!(outcome
            .error
            .as_deref()
            .is_some_and(|error| error.contains("upstream exploded")));

        engine.finish("result")?;
        let types = event_types(&temp.path().join("events.jsonl"))?;
        let position = |name: &str| types.iter().position(|value| value == name);
        assert!(position("generation_started") < position("generation_failed"));
        assert!(position("generation_failed") < position("generation_finished"));
        assert!(position("session_finished").is_some());

        let summary: Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join("summary.json"))?)?;
        assert_eq!(summary["generations"], json!(1));
        assert_eq!(summary["failed_generations"], json!(1));
        Ok(())
    }

    #[test]
    fn non_object_completion_is_a_failure() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut engine = scripted_engine(
            temp.path(),
            fast_settings(0, 50),
            ScriptedProvider {
                delay: Duration::ZERO,
                reply: Ok(json!(["not", "an", "object"])),
            },
        )?;
        let outcome = engine.generate(&sample_input(), |_| {})?;
        assert!(outcome.is_degraded());
        Ok(())
    }

    #[test]
    fn missing_provider_is_recovered_after_minimum_wait() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let models =
            ModelRegistry::from_specs([ModelSpec::new("ghost-1", "ghost", &[STRUCTURED_JSON], None)]);
        let mut engine = BrandEngine::new(temp.path(), temp.path().join("events.jsonl"), None)?
            .with_settings(fast_settings(200, 50))
            .with_backends(models, TextProviderRegistry::new());

        let mut ticks = 0;
        let outcome = engine.generate(&sample_input(), |_| ticks += 1)?;
        assert!(outcome.is_degraded());
        assert!(outcome.elapsed_ms >= 200);
        assert!(ticks >= 2);

        let receipt: Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join("receipt-1.json"))?)?;
        assert_eq!(receipt["request"]["model"], json!("ghost-1"));
        assert_eq!(
            receipt["request"]["fallback_reason"],
            json!("No model specified; using default.")
        );
        Ok(())
    }

    #[test]
    fn settings_clamp_env_values() {
        let settings = GenerationSettings::from_lookup(|key| match key {
            "BRANDKIT_MIN_WAIT_MS" => Some("999999".to_string()),
            "BRANDKIT_TICK_MS" => Some("nope".to_string()),
            "BRANDKIT_REQUEST_TIMEOUT_S" => Some("1".to_string()),
            "BRANDKIT_TRANSPORT_RETRIES" => Some("2".to_string()),
            _ => None,
        });
        assert_eq!(settings.min_wait, Duration::from_millis(60_000));
        assert_eq!(settings.tick, Duration::from_millis(DEFAULT_TICK_MS));
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.transport_retries, 2);

        let defaults = GenerationSettings::default();
        assert_eq!(defaults.min_wait, Duration::from_millis(3000));
        assert_eq!(defaults.tick, Duration::from_millis(1000));
    }

    #[test]
    fn provider_payloads_attach_schema() {
        let request = TextRequest {
            prompt: "brand please".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(5),
            transport_retries: 0,
        };
        let openai = OpenAiProvider::build_payload(&request);
        assert_eq!(openai["model"], json!("gpt-4o-mini"));
        assert_eq!(openai["messages"][1]["content"], json!("brand please"));
        assert_eq!(openai["response_format"]["type"], json!("json_schema"));
        assert_eq!(
            openai["response_format"]["json_schema"]["schema"],
            response_schema(SchemaDialect::JsonSchema)
        );

        let gemini = GeminiProvider::build_payload(&request);
        assert_eq!(gemini["contents"][0]["parts"][0]["text"], json!("brand please"));
        assert_eq!(
            gemini["generationConfig"]["responseMimeType"],
            json!("application/json")
        );
        assert_eq!(
            gemini["generationConfig"]["responseSchema"],
            response_schema(SchemaDialect::Gemini)
        );
    }

    #[test]
    fn completion_text_extraction() -> Result<()> {
        let openai = json!({
            "choices": [{ "message": { "content": "{\"slogan\":\"Hi\"}" } }]
        });
        assert_eq!(OpenAiProvider::extract_text(&openai)?, "{\"slogan\":\"Hi\"}");
        let refused = json!({ "choices": [{ "message": { "refusal": "no" } }] });
        assert!(OpenAiProvider::extract_text(&refused).is_err());

        let gemini = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        assert_eq!(GeminiProvider::extract_text(&gemini)?, "{\"a\":1}");
        let blocked = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        let err = GeminiProvider::extract_text(&blocked)
            .err()
            .map(|err| err.to_string())
            .unwrap_or_default();
        assert!(err.contains("SAFETY"));

        assert_eq!(parse_json_text("test", "```json\n{\"a\": 1}\n```")?, json!({ "a": 1 }));
        assert!(parse_json_text("test", "not json").is_err());
        Ok(())
    }

    #[test]
    fn dryrun_answer_is_deterministic_and_parseable() -> Result<()> {
        let request = TextRequest {
            prompt: build_prompt(&sample_input()),
            model: "dryrun-text-1".to_string(),
            timeout: Duration::from_secs(1),
            transport_retries: 0,
        };
        let first = DryrunProvider.complete(&request)?;
        let second = DryrunProvider.complete(&request)?;
        assert_eq!(first.payload, second.payload);
        let ai = AiResult::from_value(&first.payload).context("dryrun payload")?;
        assert!(ai.primary_color.is_some());
        assert!(ai.secondary_color.is_some());
        assert!(ai.primary_font.is_some());
        assert!(ai.strategy.is_some());
        Ok(())
    }

    #[test]
    fn gemini_endpoint_accepts_prefixed_model() {
        let provider = GeminiProvider {
            api_base: "https://example.test/v1beta".to_string(),
            http: HttpClient::new(),
        };
        assert_eq!(
            provider.endpoint_for_model("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            provider.endpoint_for_model("models/gemini-2.5-pro"),
            "https://example.test/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
