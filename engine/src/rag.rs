//! Retrieval-grounded micro-lesson.
//!
//! A lesson runs ELICIT, SYNTH, QUIZ in that order regardless of what the
//! learner writes. This module owns the flow state and the lesson text; the
//! policy drives the transitions.

use std::sync::LazyLock;

use regex::Regex;
use socratic_types::RagPhase;

use crate::service::{IngestReport, IngestStatus};
use crate::triggers::RagStart;

/// System instruction for draft feedback in SYNTH.
pub const COACH_SYSTEM: &str = "You are a writing coach for a short explanation grounded in sources. Give feedback in at most five sentences: say whether the draft is correct with respect to the context, how well it uses the evidence, how clear it is, and name one concrete improvement. Do not rewrite the draft.";

/// Feedback used when no generator is registered.
pub const OFFLINE_FEEDBACK: &str = "Check each sentence of your draft against the passages: is every claim backed by a cited source? Then tighten your reasoning so it links the evidence to the claim in one step.";

static SOURCE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\(source: (.+)\)$").expect("valid source url regex"));

/// State of an active lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagFlow {
    phase: RagPhase,
    topic: String,
    urls: Vec<String>,
    last_context: Option<String>,
}

impl RagFlow {
    /// A new lesson in ELICIT. Without explicit URLs the defaults are used.
    #[must_use]
    pub fn start(start: RagStart, default_urls: &[String]) -> Self {
        let urls = if start.urls.is_empty() {
            default_urls.to_vec()
        } else {
            start.urls
        };
        Self {
            phase: RagPhase::Elicit,
            topic: start.topic,
            urls,
            last_context: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> RagPhase {
        self.phase
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[must_use]
    pub fn last_context(&self) -> Option<&str> {
        self.last_context.as_deref()
    }

    pub fn set_context(&mut self, context: String) {
        self.last_context = Some(context);
    }

    /// Move to the next phase. QUIZ has no successor; the caller drops the flow.
    pub fn advance(&mut self) {
        self.phase = match self.phase {
            RagPhase::Elicit => RagPhase::Synth,
            RagPhase::Synth | RagPhase::Quiz => RagPhase::Quiz,
        };
    }
}

#[must_use]
pub fn elicitation(topic: &str) -> String {
    format!(
        "Before we look at any sources: what do you already know about {topic}? \
         Write one or two sentences, even if you are unsure."
    )
}

/// Source URLs cited in a context block, deduplicated in first-seen order.
#[must_use]
pub fn extract_source_urls(context: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for caps in SOURCE_URL.captures_iter(context) {
        let url = caps[1].trim();
        if !url.is_empty() && !urls.iter().any(|seen| seen == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Claim, evidence, reasoning, limits scaffold around the retrieved passages.
#[must_use]
pub fn scaffold(topic: &str, prior: &str, context: &str) -> String {
    let sources = extract_source_urls(context);
    let mut out = format!(
        "You said: \"{}\"\n\nHere is what the sources say about {topic}:\n{context}\n\n\
         Now draft a short explanation using this scaffold:\n\
         - Claim: one sentence that answers the topic.\n\
         - Evidence: quote or paraphrase at least one passage above.\n\
         - Reasoning: explain how the evidence supports the claim.\n\
         - Limits: name one case where the claim may not hold.",
        prior.trim()
    );
    if !sources.is_empty() {
        out.push_str("\n\nSources:");
        for url in &sources {
            out.push_str("\n- ");
            out.push_str(url);
        }
    }
    out
}

/// One `[error during ingest: …]` line per source that could not be indexed.
#[must_use]
pub fn ingest_failures(report: &IngestReport) -> Vec<String> {
    report
        .entries()
        .iter()
        .filter_map(|(url, status)| match status {
            IngestStatus::Failed(message) => Some(format!("[error during ingest: {url}: {message}]")),
            IngestStatus::Chunks(_) => None,
        })
        .collect()
}

/// User turn for the SYNTH coach.
#[must_use]
pub fn feedback_prompt(context: &str, draft: &str) -> String {
    format!("Context:\n{context}\n\nDraft:\n{draft}\n\nFeedback:")
}

#[must_use]
pub fn quiz(topic: &str) -> String {
    format!(
        "Quick check:\n\
         1. In one sentence, what is {topic}?\n\
         2. Which source supports your main claim, and what does it say?\n\
         3. Name one limitation of your explanation."
    )
}

#[must_use]
pub fn closing(topic: &str) -> String {
    format!(
        "Thanks for your answers. Compare them with the passages and your draft; \
         where they differ, the sources win. That completes the lesson on {topic}."
    )
}
