//! Result Interpreter — one external call, then text → typed report.
//!
//! Flow: complete → strip_code_fences → serde_json parse → check_ranges.
//! Every failure collapses to `AnalysisError`, which keeps transport and
//! decode causes apart for logs while sharing one user-facing message.

use thiserror::Error;

use crate::analysis::report::{AnalysisReport, RangeViolation};
use crate::llm_client::{LlmError, PromptRequest, TextGenerator};

/// The only failure text ever shown to a user.
pub const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed. Please try again.";

/// Fence markers removed from model output before parsing. Order matters:
/// the labelled marker must go before the bare one.
const FENCE_MARKERS: [&str; 2] = ["```json", "```"];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid report JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report values out of range: {}", format_violations(.0))]
    OutOfRange(Vec<RangeViolation>),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("transport failure: {0}")]
    Transport(#[from] LlmError),

    #[error("decode failure: {0}")]
    Decode(#[from] DecodeError),
}

/// Coarse failure kind kept on the session for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Decode,
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::Transport(_) => FailureKind::Transport,
            AnalysisError::Decode(_) => FailureKind::Decode,
        }
    }

    /// What the user sees. Identical for every cause.
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }
}

fn format_violations(violations: &[RangeViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Removes every ```json and ``` marker, then trims.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
        .trim()
        .to_string()
}

/// Reduces raw model text to a validated report.
pub fn interpret_response(text: &str) -> Result<AnalysisReport, DecodeError> {
    let cleaned = strip_code_fences(text);
    let report: AnalysisReport = serde_json::from_str(&cleaned)?;

    let violations = report.check_ranges();
    if !violations.is_empty() {
        return Err(DecodeError::OutOfRange(violations));
    }

    Ok(report)
}

/// Issues exactly one call and interprets its text.
pub async fn run_analysis(
    generator: &dyn TextGenerator,
    request: &PromptRequest,
) -> Result<AnalysisReport, AnalysisError> {
    let text = generator.complete(request).await?;
    Ok(interpret_response(&text)?)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::llm_client::{LlmError, PromptRequest, TextGenerator};

    /// Scripted generator: replays canned replies in order and counts calls.
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        delay: Duration,
        calls: AtomicUsize,
        pub last_request: Mutex<Option<PromptRequest>>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn failing(status: u16) -> Self {
            Self::new(vec![Err(LlmError::Api {
                status,
                message: "upstream unavailable".to_string(),
            })])
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, request: &PromptRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }
}
