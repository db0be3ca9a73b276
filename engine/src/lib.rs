//! Dialogue engine for the Socratic tutor.
//!
//! The [`DialoguePolicy`] state machine tracks a learner's goal, criteria,
//! and evidence, scores readiness, and picks the next speech act. An
//! [`Orchestrator`] owns one policy per conversation and exposes the
//! service surface (`step`, `ingest`, `ask`). Collaborators are reached
//! through the typed [`Capabilities`] registry.

pub mod act;
pub mod capabilities;
pub mod config;
pub mod deference;
pub mod generation;
pub mod init;
pub mod orchestrator;
pub mod policy;
pub mod rag;
pub mod readiness;
pub mod service;
pub mod templates;
pub mod triggers;

pub use capabilities::{
    Capabilities, CapabilitiesBuilder, CapabilityError, CapabilityFut, GenerationError, Generator,
    Retriever, Verifier,
};
pub use config::{ConfigError, SocraticConfig};
pub use generation::ProviderGenerator;
pub use init::{InitError, capabilities_from_config, orchestrator_from_config};
pub use orchestrator::Orchestrator;
pub use policy::{DialoguePolicy, PolicySettings};
pub use service::{ContentSource, IngestReport, IngestStatus, RagService, WebContentSource};

pub use socratic_retrieval::{self, SharedIndex};
pub use socratic_types::{self, RagPhase, Readiness, SpeechAct, Stance, TurnResult};
