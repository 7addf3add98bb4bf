//! Core data types shared across the harness.
//!
//! A `Prompt` goes in, one `GenerationResult` per configured `ProviderSpec`
//! comes out, bundled as a `ComparisonSet`. Results serialize to JSON for
//! report output: image bytes as base64, timestamps as epoch milliseconds.

use crate::error::{ErrorKind, ProviderError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant, SystemTime};

/// The kind of generation requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
}

impl Modality {
    /// Parse a modality from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Image => f.write_str("image"),
        }
    }
}

/// Optional per-call generation parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationParams {
    /// Output image width in pixels
    pub width: Option<u32>,

    /// Output image height in pixels
    pub height: Option<u32>,

    /// Sampling temperature (text models)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate (text models)
    pub max_tokens: Option<u32>,

    /// Noise seed (image models). Unset means each adapter draws its own
    /// random seed per call.
    pub seed: Option<u64>,
}

/// The prompt for one comparison run.
///
/// Immutable once built: the dispatcher and every adapter see the same
/// value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    text: String,
    modality: Option<Modality>,
    params: GenerationParams,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            modality: None,
            params: GenerationParams::default(),
        }
    }

    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = Some(modality);
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn modality(&self) -> Option<Modality> {
        self.modality
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// A prompt that is empty after trimming is rejected by dispatch.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Identifies one adapter instance: which provider, which model, and the
/// modality it serves. Configured at startup, immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub provider: String,
    pub model: String,
    pub modality: Modality,
}

impl ProviderSpec {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, modality: Modality) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            modality,
        }
    }
}

impl std::fmt::Display for ProviderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// A modality-specific generation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modality", rename_all = "lowercase")]
pub enum Payload {
    Text {
        text: String,
    },
    Image {
        #[serde(with = "bytes_base64")]
        bytes: Vec<u8>,
        /// Image format identifier (e.g., "png")
        format: String,
    },
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(bytes: Vec<u8>, format: impl Into<String>) -> Self {
        Self::Image {
            bytes,
            format: format.into(),
        }
    }

    pub fn modality(&self) -> Modality {
        match self {
            Self::Text { .. } => Modality::Text,
            Self::Image { .. } => Modality::Image,
        }
    }
}

/// Outcome status of one adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

/// The error recorded on a failure entry: category plus human-readable
/// message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ProviderError> for ResultError {
    fn from(err: &ProviderError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Wall-clock and elapsed timing for one adapter call.
#[derive(Debug, Clone, Copy)]
pub struct CallTiming {
    pub started_at: SystemTime,
    pub completed_at: SystemTime,
    pub latency: Duration,
}

/// Running timer for an in-flight adapter call.
#[derive(Debug, Clone, Copy)]
pub struct CallTimer {
    started_at: SystemTime,
    t0: Instant,
}

impl CallTimer {
    pub fn start() -> Self {
        Self {
            started_at: SystemTime::now(),
            t0: Instant::now(),
        }
    }

    pub fn stop(&self) -> CallTiming {
        CallTiming {
            started_at: self.started_at,
            completed_at: SystemTime::now(),
            latency: self.t0.elapsed(),
        }
    }
}

/// One adapter's outcome for one prompt.
///
/// Invariant: `payload` is present iff `status == Success`; `error` is
/// present iff `status == Failure`. The constructors are the only way to
/// build one, so the invariant holds everywhere downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub spec: ProviderSpec,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ResultError>,
    #[serde(with = "duration_millis")]
    pub latency: Duration,
    #[serde(with = "time_millis")]
    pub started_at: SystemTime,
    #[serde(with = "time_millis")]
    pub completed_at: SystemTime,
}

impl GenerationResult {
    pub fn success(spec: ProviderSpec, payload: Payload, timing: CallTiming) -> Self {
        Self {
            spec,
            status: Status::Success,
            payload: Some(payload),
            error: None,
            latency: timing.latency,
            started_at: timing.started_at,
            completed_at: timing.completed_at,
        }
    }

    pub fn failure(spec: ProviderSpec, error: ResultError, timing: CallTiming) -> Self {
        Self {
            spec,
            status: Status::Failure,
            payload: None,
            error: Some(error),
            latency: timing.latency,
            started_at: timing.started_at,
            completed_at: timing.completed_at,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// The ordered collection of per-provider results for one prompt.
///
/// Same order as the dispatched provider list, one entry per spec,
/// failures included as labeled entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSet {
    prompt: String,
    results: Vec<GenerationResult>,
}

impl ComparisonSet {
    pub(crate) fn new(prompt: String, results: Vec<GenerationResult>) -> Self {
        Self { prompt, results }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn results(&self) -> &[GenerationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GenerationResult> {
        self.results.iter()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn into_results(self) -> Vec<GenerationResult> {
        self.results
    }
}

impl<'a> IntoIterator for &'a ComparisonSet {
    type Item = &'a GenerationResult;
    type IntoIter = std::slice::Iter<'a, GenerationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Serialize byte payloads as base64 strings.
mod bytes_base64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        base64::engine::general_purpose::STANDARD
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Serialize durations as integer milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(de)?))
    }
}

/// Serialize timestamps as epoch milliseconds.
mod time_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S: Serializer>(t: &SystemTime, ser: S) -> Result<S::Ok, S::Error> {
        let millis = t
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        ser.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<SystemTime, D::Error> {
        Ok(UNIX_EPOCH + Duration::from_millis(u64::deserialize(de)?))
    }
}
