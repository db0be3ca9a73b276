//! Learner ledger and reasoning trace.

use serde::{Deserialize, Serialize};

use crate::NonEmptyString;

/// What the learner has committed to so far.
///
/// Only grows during a conversation: the goal may be overwritten by a later
/// goal statement but is never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    goal: Option<NonEmptyString>,
    criteria: Vec<String>,
    assumptions: Vec<String>,
    open_questions: Vec<String>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn goal(&self) -> Option<&NonEmptyString> {
        self.goal.as_ref()
    }

    #[must_use]
    pub fn has_goal(&self) -> bool {
        self.goal.is_some()
    }

    /// Record a goal statement. Blank text is ignored.
    pub fn set_goal(&mut self, text: &str) {
        if let Ok(goal) = NonEmptyString::new(text) {
            self.goal = Some(goal);
        }
    }

    #[must_use]
    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    pub fn add_criterion(&mut self, text: impl Into<String>) {
        self.criteria.push(text.into());
    }

    #[must_use]
    pub fn assumptions(&self) -> &[String] {
        &self.assumptions
    }

    pub fn add_assumption(&mut self, text: impl Into<String>) {
        self.assumptions.push(text.into());
    }

    #[must_use]
    pub fn open_questions(&self) -> &[String] {
        &self.open_questions
    }

    pub fn add_open_question(&mut self, text: impl Into<String>) {
        self.open_questions.push(text.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Claim,
    Step,
    Evidence,
    Counterexample,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningNode {
    pub kind: NodeKind,
    pub text: String,
}

/// Append-only log of reasoning nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningTrace {
    nodes: Vec<ReasoningNode>,
}

impl ReasoningTrace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, text: impl Into<String>) {
        self.nodes.push(ReasoningNode {
            kind,
            text: text.into(),
        });
    }

    #[must_use]
    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|node| node.kind == kind).count()
    }

    #[must_use]
    pub fn nodes(&self) -> &[ReasoningNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
