//! Speech act selection.
//!
//! The progression is ASK, PROBE, SUMMARIZE (once), then CHALLENGE until
//! readiness reaches `tau`, then VERIFY. A forced verification skips ahead
//! to VERIFY once a goal and a criterion exist.

use socratic_types::{Ledger, Readiness, SpeechAct, Stance};

/// Everything act selection reads.
#[derive(Debug, Clone, Copy)]
pub struct ActInputs<'a> {
    pub ledger: &'a Ledger,
    pub readiness: Readiness,
    pub stance: Stance,
    pub summarized: bool,
    pub force_verify: bool,
    pub tau: f64,
}

/// Chosen act and the controller state it leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActDecision {
    pub act: SpeechAct,
    pub stance: Stance,
    pub summarized: bool,
}

#[must_use]
pub fn choose_act(inputs: ActInputs<'_>) -> ActDecision {
    let ActInputs {
        ledger,
        readiness,
        mut stance,
        summarized,
        force_verify,
        tau,
    } = inputs;

    let explore = |act| ActDecision {
        act,
        stance: Stance::Explore,
        summarized,
    };

    if !ledger.has_goal() {
        return explore(SpeechAct::Ask);
    }
    if ledger.criteria().is_empty() {
        return explore(SpeechAct::Probe);
    }

    if stance != Stance::Verify {
        if !summarized && !force_verify {
            return ActDecision {
                act: SpeechAct::Summarize,
                stance: Stance::Explore,
                summarized: true,
            };
        }
        stance = Stance::Verify;
    }

    let act = if force_verify || readiness.meets(tau) {
        SpeechAct::Verify
    } else {
        SpeechAct::Challenge
    };
    ActDecision {
        act,
        stance,
        summarized,
    }
}
