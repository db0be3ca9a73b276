//! Capability registry.
//!
//! The policy talks to its collaborators through three narrow traits,
//! resolved once when a [`Capabilities`] value is built:
//!
//! - [`Verifier`] - checks a learner's claim (required)
//! - [`Generator`] - produces tutor text from a system instruction and a user turn
//!   (optional; fixed templates are used without one)
//! - [`Retriever`] - ingests sources and answers context queries (optional;
//!   lessons proceed without passages when absent)

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use socratic_providers::ProviderError;
use socratic_tools::CheckNumericClaim;
use socratic_types::VerificationOutcome;
use thiserror::Error;

use crate::service::IngestReport;

/// Boxed future returned by capability calls.
pub type CapabilityFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("generator returned no text")]
    Empty,
}

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("required capability `{0}` is not registered")]
    Missing(&'static str),
    #[error("verification failed: {0}")]
    Verification(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub trait Verifier: Send + Sync {
    fn verify<'a>(
        &'a self,
        hypothesis: &'a str,
    ) -> CapabilityFut<'a, Result<VerificationOutcome, CapabilityError>>;
}

pub trait Generator: Send + Sync {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> CapabilityFut<'a, Result<String, GenerationError>>;
}

pub trait Retriever: Send + Sync {
    /// Ingest sources; per-URL failures are reported, never raised.
    fn ingest<'a>(&'a self, urls: &'a [String]) -> CapabilityFut<'a, IngestReport>;

    /// Ranked context for `question`, or a fixed "no context" message.
    fn ask(&self, question: &str, top_k: usize) -> String;
}

impl Verifier for CheckNumericClaim {
    fn verify<'a>(
        &'a self,
        hypothesis: &'a str,
    ) -> CapabilityFut<'a, Result<VerificationOutcome, CapabilityError>> {
        Box::pin(async move { Ok(self.check(hypothesis)) })
    }
}

/// Collaborators resolved for one policy.
#[derive(Clone)]
pub struct Capabilities {
    verifier: Arc<dyn Verifier>,
    generator: Option<Arc<dyn Generator>>,
    retriever: Option<Arc<dyn Retriever>>,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("verifier", &"registered")
            .field("generator", &self.generator.is_some())
            .field("retriever", &self.retriever.is_some())
            .finish()
    }
}

impl Capabilities {
    #[must_use]
    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::default()
    }

    /// Numeric verifier only: templates for text, no retrieval.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            verifier: Arc::new(CheckNumericClaim::new()),
            generator: None,
            retriever: None,
        }
    }

    #[must_use]
    pub fn verifier(&self) -> &dyn Verifier {
        self.verifier.as_ref()
    }

    #[must_use]
    pub fn generator(&self) -> Option<&dyn Generator> {
        self.generator.as_deref()
    }

    #[must_use]
    pub fn retriever(&self) -> Option<&dyn Retriever> {
        self.retriever.as_deref()
    }
}

#[derive(Default)]
pub struct CapabilitiesBuilder {
    verifier: Option<Arc<dyn Verifier>>,
    generator: Option<Arc<dyn Generator>>,
    retriever: Option<Arc<dyn Retriever>>,
}

impl CapabilitiesBuilder {
    pub fn verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn build(self) -> Result<Capabilities, CapabilityError> {
        let verifier = self.verifier.ok_or(CapabilityError::Missing("verifier"))?;
        Ok(Capabilities {
            verifier,
            generator: self.generator,
            retriever: self.retriever,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Capabilities, CapabilityError, Verifier};
    use socratic_tools::CheckNumericClaim;

    #[test]
    fn verifier_is_required() {
        let err = Capabilities::builder().build().unwrap_err();
        assert!(matches!(err, CapabilityError::Missing("verifier")));
        assert_eq!(
            err.to_string(),
            "required capability `verifier` is not registered"
        );
    }

    #[test]
    fn optional_capabilities_default_to_absent() {
        let caps = Capabilities::builder()
            .verifier(Arc::new(CheckNumericClaim::new()))
            .build()
            .unwrap();
        assert!(caps.generator().is_none());
        assert!(caps.retriever().is_none());
        let debug = format!("{caps:?}");
        assert!(debug.contains("generator: false"));
    }

    #[tokio::test]
    async fn numeric_tool_is_a_verifier() {
        let caps = Capabilities::offline();
        let outcome = caps
            .verifier()
            .verify("area of a circle with r=3 is 28")
            .await
            .unwrap();
        assert!(outcome.satisfied());

        let tool = CheckNumericClaim::new();
        let direct = Verifier::verify(&tool, "nothing to check").await.unwrap();
        assert!(!direct.satisfied());
    }
}
