//! Trigger detection.
//!
//! One pass over the learner message produces a [`Triggers`] value. The
//! state machine consumes only these flags and never inspects message text
//! itself.

use std::sync::LazyLock;

use regex::Regex;
use socratic_tools::extract_hypothesis;

const GOAL_PHRASES: [&str; 3] = ["my goal", "goal:", "goal is"];
const CRITERION_PHRASES: [&str; 3] = ["criterion", "criteria", "verify the criterion"];
const VERIFY_WORD: &str = "verify";

static RAG_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*RAG(?:\[([^\]]*)\])?\s*:\s*(.+)$").expect("valid RAG start regex")
});

/// `RAG: <topic>` or `RAG[<url>,<url>]: <topic>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagStart {
    pub topic: String,
    /// Explicit sources; empty means "use the configured defaults".
    pub urls: Vec<String>,
}

impl RagStart {
    #[must_use]
    pub fn parse(message: &str) -> Option<Self> {
        let caps = RAG_START.captures(message)?;
        let topic = caps.get(2)?.as_str().trim();
        if topic.is_empty() {
            return None;
        }
        let urls = caps
            .get(1)
            .map(|list| {
                list.as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            topic: topic.to_string(),
            urls,
        })
    }
}

/// Flags detected in one learner message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triggers {
    pub rag_start: Option<RagStart>,
    /// Lowercased claim text, when the message states one.
    pub hypothesis: Option<String>,
    pub sets_goal: bool,
    pub adds_criterion: bool,
    pub force_verify: bool,
}

impl Triggers {
    #[must_use]
    pub fn detect(message: &str) -> Self {
        let lowered = message.to_lowercase();
        let hypothesis = extract_hypothesis(message);
        let force_verify = lowered.contains(VERIFY_WORD) || hypothesis.is_some();

        Self {
            rag_start: RagStart::parse(message),
            sets_goal: GOAL_PHRASES.iter().any(|phrase| lowered.contains(phrase)),
            adds_criterion: CRITERION_PHRASES
                .iter()
                .any(|phrase| lowered.contains(phrase)),
            force_verify,
            hypothesis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RagStart, Triggers};

    #[test]
    fn hypothesis_forces_verification() {
        let triggers = Triggers::detect("I think the area of a circle with r=3 is 28.");
        assert_eq!(
            triggers.hypothesis.as_deref(),
            Some("area of a circle with r=3 is 28")
        );
        assert!(triggers.force_verify);
        assert!(!triggers.sets_goal);
        assert!(!triggers.adds_criterion);
    }

    #[test]
    fn goal_phrases_are_case_insensitive() {
        assert!(Triggers::detect("My goal is to check if my rule works.").sets_goal);
        assert!(Triggers::detect("GOAL: learn BM25").sets_goal);
        assert!(Triggers::detect("the goal is clear").sets_goal);
        assert!(!Triggers::detect("goalkeeper").sets_goal);
    }

    #[test]
    fn verify_the_criterion_sets_both_flags() {
        let triggers = Triggers::detect("Please verify the criterion now.");
        assert!(triggers.adds_criterion);
        assert!(triggers.force_verify);
        assert!(triggers.hypothesis.is_none());
    }

    #[test]
    fn plain_message_has_no_flags() {
        assert_eq!(Triggers::detect("hello there"), Triggers::default());
    }

    #[test]
    fn rag_start_without_urls() {
        let start = RagStart::parse("RAG: explain BM25").unwrap();
        assert_eq!(start.topic, "explain BM25");
        assert!(start.urls.is_empty());
    }

    #[test]
    fn rag_start_with_url_list() {
        let start = RagStart::parse("RAG[https://a.example/x, https://b.example/y]: explain X")
            .unwrap();
        assert_eq!(start.topic, "explain X");
        assert_eq!(start.urls, vec!["https://a.example/x", "https://b.example/y"]);
    }

    #[test]
    fn rag_start_requires_prefix_and_topic() {
        assert!(RagStart::parse("rag: lowercase").is_none());
        assert!(RagStart::parse("tell me about RAG: later").is_none());
        assert!(RagStart::parse("RAG:   ").is_none());
        assert!(RagStart::parse("  RAG[]: topic").unwrap().urls.is_empty());
    }
}
