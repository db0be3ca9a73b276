//! Session orchestration.
//!
//! An [`Orchestrator`] owns one [`DialoguePolicy`] (one conversation) and
//! exposes the service surface: `step`, `ingest`, `ask`.

use socratic_types::TurnResult;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::capabilities::Capabilities;
use crate::policy::{DialoguePolicy, PolicySettings};
use crate::service::{IngestReport, IngestStatus, NO_CONTEXT};

const NO_RETRIEVER: &str = "no retriever registered";

#[derive(Debug)]
pub struct Orchestrator {
    session_id: Uuid,
    turn: u32,
    policy: DialoguePolicy,
}

impl Orchestrator {
    #[must_use]
    pub fn new(capabilities: Capabilities, settings: PolicySettings) -> Self {
        Self::from_policy(DialoguePolicy::new(capabilities, settings))
    }

    #[must_use]
    pub fn from_policy(policy: DialoguePolicy) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            turn: 0,
            policy,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Turns handled so far.
    #[must_use]
    pub fn turns(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn policy(&self) -> &DialoguePolicy {
        &self.policy
    }

    /// Forward one learner message to the policy.
    pub async fn step(&mut self, message: &str) -> TurnResult {
        self.turn += 1;
        let span = info_span!("turn", session = %self.session_id, turn = self.turn);
        let result = self.policy.step(message).instrument(span.clone()).await;

        span.in_scope(|| {
            info!(
                act = result.act.as_str(),
                stance = result.stance.as_str(),
                readiness = result.readiness.value(),
                done = result.done,
                "Turn complete"
            );
        });
        result
    }

    /// Ingest sources through the registered retriever.
    pub async fn ingest(&self, urls: &[String]) -> IngestReport {
        match self.policy.capabilities().retriever() {
            Some(retriever) => retriever.ingest(urls).await,
            None => {
                info!(urls = urls.len(), "Ingestion requested without a retriever");
                let mut report = IngestReport::default();
                for url in urls {
                    report.push(url.clone(), IngestStatus::Failed(NO_RETRIEVER.to_string()));
                }
                report
            }
        }
    }

    /// Ranked context for `question`.
    #[must_use]
    pub fn ask(&self, question: &str, top_k: Option<usize>) -> String {
        let top_k = top_k.unwrap_or(self.policy.settings().top_k);
        match self.policy.capabilities().retriever() {
            Some(retriever) => retriever.ask(question, top_k),
            None => NO_CONTEXT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use socratic_types::SpeechAct;

    use super::Orchestrator;
    use crate::capabilities::Capabilities;
    use crate::policy::PolicySettings;
    use crate::service::{IngestStatus, NO_CONTEXT};

    #[tokio::test]
    async fn counts_turns_per_session() {
        let mut session = Orchestrator::new(Capabilities::offline(), PolicySettings::default());
        let other = Orchestrator::new(Capabilities::offline(), PolicySettings::default());
        assert_ne!(session.session_id(), other.session_id());

        let turn = session.step("hi").await;
        assert_eq!(turn.act, SpeechAct::Ask);
        session.step("still here").await;
        assert_eq!(session.turns(), 2);
    }

    #[tokio::test]
    async fn service_surface_without_retriever() {
        let session = Orchestrator::new(Capabilities::offline(), PolicySettings::default());
        let urls = ["https://a.example".to_string(), "https://b.example".to_string()];
        let report = session.ingest(&urls).await;
        assert_eq!(report.entries().len(), 2);
        for url in &urls {
            assert_eq!(
                report.get(url),
                Some(&IngestStatus::Failed("no retriever registered".to_string()))
            );
        }
        assert_eq!(session.ask("anything", None), NO_CONTEXT);
    }
}
