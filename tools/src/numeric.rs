//! Circle-area claim checker.
//!
//! Recognizes `area of a circle with r=<R> is <X>` (case-insensitive) and
//! compares `X` against `πR²`.

use std::f64::consts::PI;
use std::sync::LazyLock;

use regex::Regex;
use socratic_types::{NumericFinding, VerificationOutcome};

/// Absolute error under which a claimed area counts as correct.
pub const DEFAULT_TOLERANCE: f64 = 0.5;

const UNPARSEABLE: &str = "Could not parse hypothesis; provide 'area of a circle with r=R is X'.";

static CIRCLE_AREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"area of a circle with r\s*=\s*([0-9]+(?:\.[0-9]+)?)\s*is\s*([0-9]+(?:\.[0-9]+)?)")
        .expect("valid circle area regex")
});

/// The claim substring of `message`, lowercased, if it states a circle area.
#[must_use]
pub fn extract_hypothesis(message: &str) -> Option<String> {
    let lowered = message.to_lowercase();
    CIRCLE_AREA
        .find(&lowered)
        .map(|found| found.as_str().to_string())
}

/// Checks a stated circle area against `πr²`.
#[derive(Debug, Clone, Copy)]
pub struct CheckNumericClaim {
    tolerance: f64,
}

impl Default for CheckNumericClaim {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl CheckNumericClaim {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Parse and check `hypothesis`. Text without a recognizable claim is
    /// reported as [`VerificationOutcome::Unparseable`], never an error.
    #[must_use]
    pub fn check(&self, hypothesis: &str) -> VerificationOutcome {
        let lowered = hypothesis.to_lowercase();
        let Some(caps) = CIRCLE_AREA.captures(&lowered) else {
            tracing::debug!("No circle-area claim in hypothesis");
            return VerificationOutcome::Unparseable {
                explanation: UNPARSEABLE.to_string(),
            };
        };

        // Both groups are `[0-9]+(\.[0-9]+)?`, which always parses.
        let (Ok(parsed_r), Ok(parsed_x)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
            return VerificationOutcome::Unparseable {
                explanation: UNPARSEABLE.to_string(),
            };
        };

        let true_value = PI * parsed_r * parsed_r;
        let satisfied = (true_value - parsed_x).abs() < self.tolerance;
        tracing::debug!(parsed_r, parsed_x, true_value, satisfied, "Checked circle-area claim");

        VerificationOutcome::Checked(NumericFinding {
            parsed_r,
            parsed_x,
            true_value,
            satisfied,
        })
    }
}
