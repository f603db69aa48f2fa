//! Shared types — wire schemas for the solver backend and dictation state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::speech;

// ─── Problem input ──────────────────────────────────────────────────────────

/// A problem ready for submission, in one of the three input modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemInput {
    /// Typed text, whitespace-compacted on construction.
    Text(String),
    /// A dictated transcript, already normalized to symbolic form.
    Transcript(String),
    /// An image of the problem.
    Image { file_name: String, bytes: Vec<u8> },
}

impl ProblemInput {
    pub fn text(raw: &str) -> Self {
        Self::Text(speech::compact_problem_text(raw))
    }

    pub fn transcript(expression: &str) -> Self {
        Self::Transcript(expression.trim().to_string())
    }

    pub fn image(file_name: &str, bytes: Vec<u8>) -> Self {
        Self::Image { file_name: file_name.to_string(), bytes }
    }

    /// Wire value for the `input_type` form field.
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Transcript(_) => "audio",
            Self::Image { .. } => "image",
        }
    }

    /// Reject inputs the backend cannot do anything with.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Text(t) if t.is_empty() => Err("enter a problem first".to_string()),
            Self::Transcript(t) if t.is_empty() => Err("speak a problem first".to_string()),
            Self::Image { bytes, .. } if bytes.is_empty() => {
                Err("upload an image first".to_string())
            }
            _ => Ok(()),
        }
    }
}

// ─── /parse wire schema ─────────────────────────────────────────────────────

/// Response from `POST /parse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub raw_text: String,
    pub parsed_problem: ParsedProblem,
    pub confidence: String,
    pub needs_hitl: bool,
}

/// The backend's structured reading of a problem. Posted back verbatim as
/// the `/solve` body, so it round-trips through serialization unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedProblem {
    pub problem_text: String,
    pub topic: String,
    pub operation: Option<String>,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub needs_clarification: bool,
    pub parser_metadata: ParserMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserMetadata {
    pub confidence: String,
    pub auto_detected: bool,
}

// ─── /solve wire schema ─────────────────────────────────────────────────────

/// Response from `POST /solve`. The backend may omit `results` entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    #[serde(default)]
    pub results: Vec<SolveResult>,
    #[serde(default)]
    pub total_problems: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub question: String,
    pub final_answer: FinalAnswer,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAnswer {
    pub text: String,
    #[serde(default)]
    pub latex: Option<String>,
}

/// Attribution for an answer. The backend sends either a bare string label
/// or an object with per-part labels, so this deserializes untagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Label(String),
    Split {
        #[serde(default)]
        answer: Option<String>,
        #[serde(default)]
        explanation: Option<String>,
    },
}

impl Source {
    /// Label to show next to an answer.
    pub fn answer_label(&self) -> &str {
        match self {
            Source::Label(label) => label,
            Source::Split { answer, .. } => answer.as_deref().unwrap_or("unknown"),
        }
    }

    /// Label to show next to an explanation.
    pub fn explanation_label(&self) -> &str {
        match self {
            Source::Label(label) => label,
            Source::Split { explanation, .. } => explanation.as_deref().unwrap_or("unknown"),
        }
    }
}

// ─── /feedback wire schema ──────────────────────────────────────────────────

/// Body for `POST /feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub problem: ParsedProblem,
    pub solution: SolveResponse,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
}

/// Thumbs rating for a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    /// Wire value for the `feedback` field: "correct" or "incorrect".
    pub fn as_wire(&self) -> &'static str {
        match self {
            Rating::Up => "correct",
            Rating::Down => "incorrect",
        }
    }
}

// ─── Dictation ──────────────────────────────────────────────────────────────

/// Observable dictation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DictationState {
    Idle,
    Listening,
    Stopped,
}

/// Snapshot of a dictation session.
#[derive(Debug, Clone, Serialize)]
pub struct DictationStatus {
    pub state: DictationState,
    pub transcript: String,
    pub expression: String,
}

/// One recognition event: every result segment the engine has produced so
/// far, plus the index of the first segment still subject to change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionUpdate {
    pub start_index: usize,
    pub segments: Vec<String>,
}

/// Event delivered by a recognition-engine adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Update(RecognitionUpdate),
    /// The engine's audio stream ended.
    End,
}

/// Control signal sent back to the recognition-engine adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineDirective {
    Start,
    Stop,
}

// ─── Client configuration ───────────────────────────────────────────────────

/// Solver backend connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
