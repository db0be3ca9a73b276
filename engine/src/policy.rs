//! Dialogue policy: one controller per conversation.
//!
//! Each call to [`DialoguePolicy::step`] handles one learner message:
//!
//! 1. A lesson start (`RAG: ...`) with no active lesson opens one.
//! 2. An active lesson consumes the message; the ledger is not touched.
//! 3. Otherwise the ledger is updated from the detected triggers, an act is
//!    chosen, and the response is produced by template, generator, or
//!    verifier.
//!
//! Collaborator failures never escape a turn: they become an inline
//! `[error during ACT: ...]` marker and the turn reports `done = false`.

use socratic_types::{
    Ledger, NodeKind, RagPhase, Readiness, ReasoningTrace, SpeechAct, Stance, TurnResult,
};
use tracing::{debug, warn};

use crate::act::{ActInputs, choose_act};
use crate::capabilities::Capabilities;
use crate::config::{DEFAULT_RAG_URLS, DEFAULT_TAU, DEFAULT_TOP_K, SocraticConfig};
use crate::rag::{self, RagFlow};
use crate::service::NO_CONTEXT;
use crate::triggers::{RagStart, Triggers};
use crate::{deference, readiness, templates};

/// Thresholds and lesson defaults for one policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySettings {
    /// Readiness a verified claim needs before the conversation is done.
    pub tau: f64,
    /// Passages retrieved per lesson.
    pub top_k: usize,
    /// Lesson sources when `RAG: <topic>` names none.
    pub default_urls: Vec<String>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            tau: DEFAULT_TAU,
            top_k: DEFAULT_TOP_K,
            default_urls: DEFAULT_RAG_URLS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl PolicySettings {
    #[must_use]
    pub fn from_config(config: &SocraticConfig) -> Self {
        let retrieval = config.retrieval();
        Self {
            tau: config.policy().tau(),
            top_k: retrieval.top_k(),
            default_urls: retrieval.default_urls(),
        }
    }
}

#[derive(Debug)]
pub struct DialoguePolicy {
    ledger: Ledger,
    trace: ReasoningTrace,
    stance: Stance,
    summarized: bool,
    last_hypothesis: Option<String>,
    flow: Option<RagFlow>,
    settings: PolicySettings,
    capabilities: Capabilities,
}

impl DialoguePolicy {
    #[must_use]
    pub fn new(capabilities: Capabilities, settings: PolicySettings) -> Self {
        Self {
            ledger: Ledger::default(),
            trace: ReasoningTrace::default(),
            stance: Stance::Explore,
            summarized: false,
            last_hypothesis: None,
            flow: None,
            settings,
            capabilities,
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn trace(&self) -> &ReasoningTrace {
        &self.trace
    }

    #[must_use]
    pub fn stance(&self) -> Stance {
        self.stance
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[must_use]
    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    #[must_use]
    pub fn has_summarized(&self) -> bool {
        self.summarized
    }

    #[must_use]
    pub fn last_hypothesis(&self) -> Option<&str> {
        self.last_hypothesis.as_deref()
    }

    /// Phase of the active lesson, if any.
    #[must_use]
    pub fn rag_phase(&self) -> Option<RagPhase> {
        self.flow.as_ref().map(RagFlow::phase)
    }

    #[must_use]
    pub fn readiness(&self) -> Readiness {
        readiness::compute(&self.ledger, &self.trace)
    }

    /// Handle one learner message.
    pub async fn step(&mut self, message: &str) -> TurnResult {
        let triggers = Triggers::detect(message);
        debug!(?triggers, "Detected triggers");

        if self.flow.is_none()
            && let Some(start) = triggers.rag_start.clone()
        {
            return self.start_lesson(start);
        }

        if let Some(flow) = self.flow.take() {
            return self.lesson_turn(flow, message).await;
        }

        self.update_ledger(message, &triggers);

        let decision = choose_act(ActInputs {
            ledger: &self.ledger,
            readiness: self.readiness(),
            stance: self.stance,
            summarized: self.summarized,
            force_verify: triggers.force_verify,
            tau: self.settings.tau,
        });
        self.stance = self.stance.max(decision.stance);
        self.summarized = decision.summarized;
        debug!(
            act = decision.act.as_str(),
            stance = self.stance.as_str(),
            force_verify = triggers.force_verify,
            "Chose act"
        );

        if decision.act == SpeechAct::Verify {
            let hypothesis = triggers
                .hypothesis
                .or_else(|| self.last_hypothesis.clone())
                .unwrap_or_else(|| message.to_string());
            return self.verify(&hypothesis).await;
        }

        let text = self.respond(decision.act, message).await;
        TurnResult {
            act: decision.act,
            stance: self.stance,
            readiness: self.readiness(),
            text: deference::enforce(text),
            done: false,
        }
    }

    fn update_ledger(&mut self, message: &str, triggers: &Triggers) {
        if let Some(hypothesis) = &triggers.hypothesis {
            self.last_hypothesis = Some(hypothesis.clone());
        }
        if triggers.sets_goal {
            self.ledger.set_goal(message);
        }
        if triggers.adds_criterion {
            self.ledger.add_criterion(message);
        }
    }

    async fn respond(&self, act: SpeechAct, message: &str) -> String {
        let Some(generator) = self.capabilities.generator() else {
            return templates::offline_text(act, &self.ledger);
        };

        let prompt = templates::generation_prompt(act, message);
        match generator.generate(templates::TUTOR_SYSTEM, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(act = act.as_str(), error = %e, "Generation failed");
                templates::error_marker(act, &e)
            }
        }
    }

    async fn verify(&mut self, hypothesis: &str) -> TurnResult {
        let outcome = self.capabilities.verifier().verify(hypothesis).await;

        let (text, done) = match outcome {
            Ok(outcome) => {
                let finding = outcome.to_string();
                self.trace.push(NodeKind::Evidence, finding.clone());
                let done = self.stance == Stance::Verify
                    && self.readiness().meets(self.settings.tau)
                    && outcome.satisfied();
                debug!(satisfied = outcome.satisfied(), done, "Verified hypothesis");
                (format!("Verification finding: {finding}"), done)
            }
            Err(e) => {
                warn!(error = %e, "Verification failed");
                (templates::error_marker(SpeechAct::Verify, &e), false)
            }
        };

        TurnResult {
            act: SpeechAct::Verify,
            stance: self.stance,
            readiness: self.readiness(),
            text,
            done,
        }
    }

    fn start_lesson(&mut self, start: RagStart) -> TurnResult {
        let flow = RagFlow::start(start, &self.settings.default_urls);
        debug!(topic = flow.topic(), urls = flow.urls().len(), "Lesson started");
        let text = deference::enforce(rag::elicitation(flow.topic()));
        self.flow = Some(flow);

        TurnResult {
            act: SpeechAct::Ask,
            stance: Stance::Explore,
            readiness: self.readiness(),
            text,
            done: false,
        }
    }

    async fn lesson_turn(&mut self, mut flow: RagFlow, message: &str) -> TurnResult {
        let phase = flow.phase();
        let readiness = self.readiness().max(phase.readiness_floor());
        debug!(phase = ?phase, topic = flow.topic(), "Lesson turn");

        match phase {
            RagPhase::Elicit => {
                let (context, failures) = match self.capabilities.retriever() {
                    Some(retriever) => {
                        let report = retriever.ingest(flow.urls()).await;
                        if report.failures() > 0 {
                            warn!(failed = report.failures(), "Lesson sources unavailable");
                        }
                        (
                            retriever.ask(flow.topic(), self.settings.top_k),
                            rag::ingest_failures(&report),
                        )
                    }
                    None => (NO_CONTEXT.to_string(), Vec::new()),
                };
                let mut text = rag::scaffold(flow.topic(), message, &context);
                for line in &failures {
                    text.push('\n');
                    text.push_str(line);
                }
                flow.set_context(context);
                flow.advance();
                self.flow = Some(flow);

                TurnResult {
                    act: SpeechAct::Verify,
                    stance: Stance::Verify,
                    readiness,
                    text,
                    done: false,
                }
            }
            RagPhase::Synth => {
                let feedback = self.coach_feedback(&flow, message).await;
                let text = format!("{feedback}\n\n{}", rag::quiz(flow.topic()));
                flow.advance();
                self.flow = Some(flow);

                TurnResult {
                    act: SpeechAct::Summarize,
                    stance: Stance::Explore,
                    readiness,
                    text,
                    done: false,
                }
            }
            RagPhase::Quiz => {
                debug!(topic = flow.topic(), "Lesson complete");
                TurnResult {
                    act: SpeechAct::Verify,
                    stance: Stance::Verify,
                    readiness,
                    text: rag::closing(flow.topic()),
                    done: true,
                }
            }
        }
    }

    async fn coach_feedback(&self, flow: &RagFlow, draft: &str) -> String {
        let Some(generator) = self.capabilities.generator() else {
            return rag::OFFLINE_FEEDBACK.to_string();
        };

        let context = flow.last_context().unwrap_or(NO_CONTEXT);
        let prompt = rag::feedback_prompt(context, draft);
        match generator.generate(rag::COACH_SYSTEM, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Draft feedback failed");
                templates::error_marker(SpeechAct::Summarize, &e)
            }
        }
    }
}
