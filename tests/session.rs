use std::sync::atomic::{AtomicUsize, Ordering};

use textsum::session::{self, SessionState};
use textsum::summarizer::{Summarize, SummarizerError, SummaryOutcome};

/// Scripted summarizer that records how often it was invoked.
struct StubSummarizer {
    outcome: fn() -> Result<SummaryOutcome, SummarizerError>,
    calls: AtomicUsize,
}

impl StubSummarizer {
    fn new(outcome: fn() -> Result<SummaryOutcome, SummarizerError>) -> Self {
        Self { outcome, calls: AtomicUsize::new(0) }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Summarize for StubSummarizer {
    fn summarize(&self, _text: &str) -> Result<SummaryOutcome, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.outcome)()
    }
}

fn labels_of(states: &[SessionState]) -> Vec<&'static str> {
    states.iter().map(|s| s.label()).collect()
}

#[test]
fn test_blank_input_is_rejected_without_invoking_the_summarizer() {
    let stub = StubSummarizer::new(|| Ok(SummaryOutcome::Summary("unused".to_string())));

    for input in ["", "   ", "\n\t  \n", "\u{a0}"] {
        let mut observed = Vec::new();
        let state = session::submit(input, &stub, &mut |s| observed.push(s.clone()));

        assert_eq!(state, SessionState::Idle, "input {:?} should be rejected", input);
        assert_eq!(labels_of(&observed), ["validating", "idle"]);
    }
    assert_eq!(stub.call_count(), 0);
}

#[test]
fn test_successful_generation_reaches_success_with_the_summary() {
    let stub = StubSummarizer::new(|| {
        Ok(SummaryOutcome::Summary("A short account of the events.".to_string()))
    });

    let mut observed = Vec::new();
    let state = session::submit("A long article body.", &stub, &mut |s| observed.push(s.clone()));

    assert_eq!(
        state,
        SessionState::Success("A short account of the events.".to_string())
    );
    assert_eq!(labels_of(&observed), ["validating", "running", "success"]);
    assert_eq!(stub.call_count(), 1);
}

#[test]
fn test_empty_generation_reaches_empty_result() {
    let stub = StubSummarizer::new(|| Ok(SummaryOutcome::Empty));

    let mut observed = Vec::new();
    let state = session::submit("Terse input.", &stub, &mut |s| observed.push(s.clone()));

    assert_eq!(state, SessionState::EmptyResult);
    assert_eq!(labels_of(&observed), ["validating", "running", "empty"]);
}

#[test]
fn test_failure_reaches_error_with_the_cause_text() {
    let stub = StubSummarizer::new(|| {
        Err(SummarizerError::Tokenization("malformed encoding in input".to_string()))
    });

    let mut observed = Vec::new();
    let state = session::submit("Some input.", &stub, &mut |s| observed.push(s.clone()));

    match state {
        SessionState::Error(message) => {
            assert!(message.contains("malformed encoding in input"));
            assert!(message.contains("Tokenization failed"));
        }
        other => panic!("expected Error state, got {:?}", other),
    }
    assert_eq!(labels_of(&observed), ["validating", "running", "error"]);
}
