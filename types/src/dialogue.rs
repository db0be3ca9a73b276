//! Speech acts, stance, readiness, and the per-turn result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pedagogical move selected for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpeechAct {
    Ask,
    Clarify,
    Probe,
    Challenge,
    Summarize,
    Verify,
}

impl SpeechAct {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SpeechAct::Ask => "ASK",
            SpeechAct::Clarify => "CLARIFY",
            SpeechAct::Probe => "PROBE",
            SpeechAct::Challenge => "CHALLENGE",
            SpeechAct::Summarize => "SUMMARIZE",
            SpeechAct::Verify => "VERIFY",
        }
    }
}

impl fmt::Display for SpeechAct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controller stance.
///
/// Ordered so that `Explore < Verify`; a conversation only ever moves up.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stance {
    #[default]
    Explore,
    Verify,
}

impl Stance {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Stance::Explore => "EXPLORE",
            Stance::Verify => "VERIFY",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of an active retrieval-grounded micro-lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RagPhase {
    Elicit,
    Synth,
    Quiz,
}

impl RagPhase {
    /// Readiness floor reported for a turn handled in this phase.
    #[must_use]
    pub fn readiness_floor(self) -> Readiness {
        match self {
            RagPhase::Elicit => Readiness::new(0.6),
            RagPhase::Synth => Readiness::new(0.65),
            RagPhase::Quiz => Readiness::new(0.7),
        }
    }
}

/// Readiness score in `[0, 1]`, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Readiness(f64);

impl Readiness {
    pub const ZERO: Readiness = Readiness(0.0);

    /// Clamp to `[0, 1]` and round to two decimals. NaN maps to zero.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        let clamped = value.clamp(0.0, 1.0);
        Self((clamped * 100.0).round() / 100.0)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn max(self, other: Readiness) -> Readiness {
        if other.0 > self.0 { other } else { self }
    }

    #[must_use]
    pub fn meets(self, tau: f64) -> bool {
        self.0 >= tau
    }
}

impl From<f64> for Readiness {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Readiness> for f64 {
    fn from(value: Readiness) -> Self {
        value.0
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Outcome of one learner turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub act: SpeechAct,
    pub stance: Stance,
    pub readiness: Readiness,
    pub text: String,
    pub done: bool,
}
