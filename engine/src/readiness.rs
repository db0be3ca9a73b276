//! Readiness scoring.
//!
//! Each component is capped on its own, then the sum is clamped to 1.0 and
//! rounded to two decimals by [`Readiness::new`].

use socratic_types::{Ledger, NodeKind, Readiness, ReasoningTrace};

const GOAL_WEIGHT: f64 = 0.30;

const CRITERIA_BASE: f64 = 0.20;
const CRITERIA_STEP: f64 = 0.05;
const CRITERIA_CAP: f64 = 0.40;

const EVIDENCE_BASE: f64 = 0.10;
const EVIDENCE_STEP: f64 = 0.05;
const EVIDENCE_CAP: f64 = 0.20;

const COUNTEREXAMPLE_STEP: f64 = 0.05;
const COUNTEREXAMPLE_CAP: f64 = 0.10;

fn stepped(count: usize, base: f64, step: f64, cap: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (base + step * (count - 1) as f64).min(cap)
}

#[must_use]
pub fn goal_component(ledger: &Ledger) -> f64 {
    if ledger.has_goal() { GOAL_WEIGHT } else { 0.0 }
}

#[must_use]
pub fn criteria_component(count: usize) -> f64 {
    stepped(count, CRITERIA_BASE, CRITERIA_STEP, CRITERIA_CAP)
}

#[must_use]
pub fn evidence_component(count: usize) -> f64 {
    stepped(count, EVIDENCE_BASE, EVIDENCE_STEP, EVIDENCE_CAP)
}

#[must_use]
pub fn counterexample_component(count: usize) -> f64 {
    (COUNTEREXAMPLE_STEP * count as f64).min(COUNTEREXAMPLE_CAP)
}

/// Readiness as a pure function of the ledger and reasoning trace.
#[must_use]
pub fn compute(ledger: &Ledger, trace: &ReasoningTrace) -> Readiness {
    let total = goal_component(ledger)
        + criteria_component(ledger.criteria().len())
        + evidence_component(trace.count(NodeKind::Evidence))
        + counterexample_component(trace.count(NodeKind::Counterexample));
    Readiness::new(total)
}
