//! Core domain types for the Socratic tutor.
//!
//! Pure data: no IO, no async. Everything here can be used from any layer.

mod dialogue;
mod ledger;
mod provider;
mod text;
mod verification;

pub use dialogue::{RagPhase, Readiness, SpeechAct, Stance, TurnResult};
pub use ledger::{Ledger, NodeKind, ReasoningNode, ReasoningTrace};
pub use provider::{ApiKey, ModelName, ModelParseError, Provider};
pub use text::{EmptyStringError, NonEmptyString};
pub use verification::{NumericFinding, VerificationOutcome};
