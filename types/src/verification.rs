//! Structured verification findings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed and checked numeric claim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericFinding {
    pub parsed_r: f64,
    pub parsed_x: f64,
    pub true_value: f64,
    pub satisfied: bool,
}

impl fmt::Display for NumericFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parsed_r={:?}, parsed_x={:?}, truth≈{:.2}, satisfies={}",
            self.parsed_r,
            self.parsed_x,
            self.true_value,
            if self.satisfied { "True" } else { "False" }
        )
    }
}

/// Result of a verification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Checked(NumericFinding),
    /// The hypothesis could not be parsed; carries the explanation shown to the learner.
    Unparseable { explanation: String },
}

impl VerificationOutcome {
    #[must_use]
    pub fn satisfied(&self) -> bool {
        match self {
            VerificationOutcome::Checked(finding) => finding.satisfied,
            VerificationOutcome::Unparseable { .. } => false,
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationOutcome::Checked(finding) => finding.fmt(f),
            VerificationOutcome::Unparseable { explanation } => f.write_str(explanation),
        }
    }
}
