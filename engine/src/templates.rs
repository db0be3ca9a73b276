//! Fixed tutor phrasing and generation prompts.

use std::fmt;

use socratic_types::{Ledger, SpeechAct};

/// System instruction for delegated generation outside the lesson flow.
pub const TUTOR_SYSTEM: &str = "You are a Socratic tutor. Before readiness, DO NOT provide final answers, numeric conclusions, or verdicts. Ask one focused question or reflect the learner's reasoning.";

const ASK: &str = "What is your exact goal and what assumptions are you making?";
const CLARIFY: &str =
    "When you say that, do you mean the rule holds for all r or a specific case?";
const PROBE: &str =
    "State one concrete criterion we can test (e.g., a numeric check you’d accept).";
const CHALLENGE: &str = "Consider r=10: would your rule still match πr²? If not, how adjust?";
const VERIFY: &str = "Running the minimal check now.";

/// Offline text for `act`. SUMMARIZE reflects the ledger back.
#[must_use]
pub fn offline_text(act: SpeechAct, ledger: &Ledger) -> String {
    match act {
        SpeechAct::Ask => ASK.to_string(),
        SpeechAct::Clarify => CLARIFY.to_string(),
        SpeechAct::Probe => PROBE.to_string(),
        SpeechAct::Challenge => CHALLENGE.to_string(),
        SpeechAct::Summarize => summary(ledger),
        SpeechAct::Verify => VERIFY.to_string(),
    }
}

#[must_use]
pub fn summary(ledger: &Ledger) -> String {
    let goal = ledger.goal().map_or("(not stated)", |goal| goal.as_str());
    format!(
        "Here’s your current state.\nGoal: {goal}\nCriteria: {:?}\nOpen questions: {:?}",
        ledger.criteria(),
        ledger.open_questions()
    )
}

/// User turn sent to the generator, tagged with the chosen act.
#[must_use]
pub fn generation_prompt(act: SpeechAct, message: &str) -> String {
    format!("[ACT={act}] User: {message}\nTutor:")
}

/// Inline marker for a failed delegated call.
#[must_use]
pub fn error_marker(act: SpeechAct, detail: &impl fmt::Display) -> String {
    format!("[error during {act}: {detail}]")
}
