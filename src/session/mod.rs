//! # Session Module
//!
//! The per-submission state machine shared by both presentation
//! surfaces (the browser page and the terminal session):
//!
//! Idle -> Validating -> Running -> {Success | EmptyResult | Error}
//!
//! Empty or whitespace-only input short-circuits Validating back to
//! Idle with a warning and never reaches the inference service.

use tracing::{info, warn};

use crate::summarizer::{Summarize, SummaryOutcome};

/// Warning shown when a submission is empty or whitespace-only
pub const VALIDATION_WARNING: &str = "Please enter text to summarize.";

/// Message shown when generation produced an empty summary
pub const EMPTY_SUMMARY_MESSAGE: &str =
    "Summary is empty. Try longer or more structured input.";

/// Status message shown while generation is in progress
pub const RUNNING_MESSAGE: &str = "Generating summary, please wait...";

/// States of the submission flow. Each submission is synchronous: it
/// ends in one of the three terminal states, or back in Idle when
/// validation rejects the input.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing in flight; also the result of a rejected submission
    Idle,
    /// Input is being checked before any inference call
    Validating,
    /// The inference service is generating
    Running,
    /// A non-empty summary was produced
    Success(String),
    /// Generation completed but the summary was empty
    EmptyResult,
    /// Tokenization or generation failed; carries the full cause text
    Error(String),
}

impl SessionState {
    /// Short name for logging.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Validating => "validating",
            SessionState::Running => "running",
            SessionState::Success(_) => "success",
            SessionState::EmptyResult => "empty",
            SessionState::Error(_) => "error",
        }
    }
}

/// Drives one submission through the state machine.
///
/// Every transition is reported through `observe` before the final
/// state is returned. A return of `SessionState::Idle` means validation
/// rejected the input and the caller should show `VALIDATION_WARNING`;
/// the summarizer is guaranteed not to have been invoked in that case.
pub fn submit(
    text: &str,
    summarizer: &dyn Summarize,
    observe: &mut dyn FnMut(&SessionState),
) -> SessionState {
    observe(&SessionState::Validating);

    if text.trim().is_empty() {
        warn!("Rejected empty submission");
        let state = SessionState::Idle;
        observe(&state);
        return state;
    }

    observe(&SessionState::Running);
    info!("Summarizing submission of {} chars", text.len());

    let state = match summarizer.summarize(text) {
        Ok(SummaryOutcome::Summary(summary)) => SessionState::Success(summary),
        Ok(SummaryOutcome::Empty) => SessionState::EmptyResult,
        Err(e) => SessionState::Error(e.to_string()),
    };
    observe(&state);
    state
}
