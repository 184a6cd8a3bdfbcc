//! Prompt Composer — turns a business plan into the request sent to the model.
//!
//! Pure: no I/O, no clock, same input always yields the same request.

use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::llm_client::PromptRequest;

/// The model used for every analysis call. Hardcoded to prevent drift.
pub const MODEL: &str = "claude-sonnet-4-5";
/// Output budget for one report.
pub const MAX_TOKENS: u32 = 1000;

/// A business plan that has been trimmed and is known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanText(String);

impl PlanText {
    /// Trims the raw input. Returns `None` for empty or whitespace-only text,
    /// in which case no request may be issued.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Builds the two-part request: fixed system instruction + the plan as the task.
pub fn compose_request(plan: &PlanText) -> PromptRequest {
    PromptRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        system: ANALYSIS_SYSTEM,
        user_message: ANALYSIS_PROMPT_TEMPLATE.replace("{business_plan}", plan.as_str()),
    }
}
