//! Verification tools the dialogue policy can call.
//!
//! Tools are deterministic and offline: they parse a claim out of learner
//! text and check it against ground truth. Results are typed
//! ([`VerificationOutcome`]) so callers branch on `satisfied()`, never on
//! rendered text.

pub mod numeric;

pub use numeric::{CheckNumericClaim, extract_hypothesis};
pub use socratic_types::{NumericFinding, VerificationOutcome};
