// Demo analysis pipeline.
// Implements: prompt composition, the single external call, report decoding,
// and per-session admission. All LLM calls go through llm_client.

pub mod composer;
pub mod handlers;
pub mod interpreter;
pub mod prompts;
pub mod report;
pub mod service;
pub mod session;
