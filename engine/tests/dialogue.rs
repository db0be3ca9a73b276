//! Whole-conversation behaviour of the dialogue policy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use socratic_engine::capabilities::{CapabilityError, CapabilityFut, GenerationError};
use socratic_engine::deference::REDIRECT;
use socratic_engine::{
    Capabilities, ContentSource, DialoguePolicy, Generator, PolicySettings, RagPhase, RagService,
    SharedIndex, SpeechAct, Stance, Verifier,
};
use socratic_tools::CheckNumericClaim;
use socratic_types::{NodeKind, VerificationOutcome};
use socratic_webfetch::{ErrorCode, WebFetchError};

const SCENARIO_ONE: [&str; 4] = [
    "I think the area of a circle with r=3 is 28.",
    "My goal is to check if my rule works.",
    "A criterion: plug r=3 into pi*r^2.",
    "Please verify the criterion now.",
];

const SCENARIO_TWO: [&str; 4] = [
    "I think the area of a circle with r=4 is 40.",
    "My goal is to check if my rule works.",
    "A criterion: plug r=4 into pi*r^2.",
    "Please verify the criterion now.",
];

/// Replies with a fixed string and records every prompt.
struct ScriptedGenerator {
    reply: Result<String, ()>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err(()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> CapabilityFut<'a, Result<String, GenerationError>> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        let reply = self.reply.clone().map_err(|()| GenerationError::Empty);
        Box::pin(async move { reply })
    }
}

struct BrokenVerifier;

impl Verifier for BrokenVerifier {
    fn verify<'a>(
        &'a self,
        _hypothesis: &'a str,
    ) -> CapabilityFut<'a, Result<VerificationOutcome, CapabilityError>> {
        Box::pin(async { Err(CapabilityError::Verification("tool crashed".to_string())) })
    }
}

struct PageSource(HashMap<String, Vec<String>>);

impl ContentSource for PageSource {
    fn chunks<'a>(&'a self, url: &'a str) -> CapabilityFut<'a, Result<Vec<String>, WebFetchError>> {
        let result = self.0.get(url).cloned().ok_or_else(|| {
            WebFetchError::new(ErrorCode::Network, "connection refused", true)
        });
        Box::pin(async move { result })
    }
}

fn offline_policy() -> DialoguePolicy {
    DialoguePolicy::new(Capabilities::offline(), PolicySettings::default())
}

fn lesson_policy(generator: Option<Arc<ScriptedGenerator>>) -> (DialoguePolicy, SharedIndex) {
    let pages = HashMap::from([
        (
            "https://a.example/rag".to_string(),
            vec![
                "retrieval augmented generation combines a retriever with a generator".to_string(),
                "the retriever ranks passages with bm25 before generation".to_string(),
            ],
        ),
        (
            "https://b.example/limits".to_string(),
            vec!["retrieval can surface stale passages which limits answers".to_string()],
        ),
    ]);
    let index = SharedIndex::default();
    let service = RagService::new(index.clone(), Arc::new(PageSource(pages)));

    let mut builder = Capabilities::builder()
        .verifier(Arc::new(CheckNumericClaim::new()))
        .retriever(Arc::new(service));
    if let Some(generator) = generator {
        builder = builder.generator(generator);
    }
    let policy = DialoguePolicy::new(builder.build().unwrap(), PolicySettings::default());
    (policy, index)
}

#[tokio::test]
async fn scenario_one_verifies_a_correct_claim() {
    let mut policy = offline_policy();
    let mut acts = Vec::new();
    let mut last = None;
    for message in SCENARIO_ONE {
        let turn = policy.step(message).await;
        acts.push(turn.act);
        last = Some(turn);
    }
    let last = last.unwrap();

    assert_eq!(
        acts,
        vec![
            SpeechAct::Ask,
            SpeechAct::Probe,
            SpeechAct::Summarize,
            SpeechAct::Verify
        ]
    );
    assert_eq!(last.stance, Stance::Verify);
    assert!(last.text.contains("satisfies=True"), "{}", last.text);
    assert!(last.text.contains("truth≈28.27"));
    assert!((last.readiness.value() - 0.65).abs() < 1e-9);
    assert!(last.done);
    assert_eq!(policy.trace().count(NodeKind::Evidence), 1);
}

#[tokio::test]
async fn scenario_two_rejects_a_wrong_claim() {
    let mut policy = offline_policy();
    let mut last = None;
    for message in SCENARIO_TWO {
        last = Some(policy.step(message).await);
    }
    let last = last.unwrap();

    assert_eq!(last.act, SpeechAct::Verify);
    assert!(last.text.contains("satisfies=False"), "{}", last.text);
    assert!(last.text.contains("truth≈50.27"));
    assert!(!last.done);
}

#[tokio::test]
async fn tau_above_reach_blocks_completion() {
    let settings = PolicySettings {
        tau: 0.9,
        ..PolicySettings::default()
    };
    let mut policy = DialoguePolicy::new(Capabilities::offline(), settings);
    let mut last = None;
    for message in SCENARIO_ONE {
        last = Some(policy.step(message).await);
    }
    let last = last.unwrap();
    assert!(last.text.contains("satisfies=True"));
    assert!(!last.done);
}

#[tokio::test]
async fn challenges_until_ready() {
    let mut policy = offline_policy();
    policy.step("My goal is to understand circle areas.").await;
    assert_eq!(
        policy.step("First criterion: it matches pi r^2.").await.act,
        SpeechAct::Summarize
    );
    let challenge = policy.step("Second criterion: it works for r=2.").await;
    assert_eq!(challenge.act, SpeechAct::Challenge);
    assert!(challenge.text.contains("r=10"));

    let third = policy.step("Third criterion: it works for r=5.").await;
    assert_eq!(third.act, SpeechAct::Challenge);

    // Goal plus four criteria reaches 0.65.
    let ready = policy.step("Fourth criterion: doubling r quadruples it.").await;
    assert_eq!(ready.act, SpeechAct::Verify);
    assert!(ready.text.starts_with("Verification finding: "));
}

#[tokio::test]
async fn generated_verdicts_are_deferred() {
    let generator = ScriptedGenerator::replying("Sure, the area is about 28.27.");
    let capabilities = Capabilities::builder()
        .verifier(Arc::new(CheckNumericClaim::new()))
        .generator(generator.clone())
        .build()
        .unwrap();
    let mut policy = DialoguePolicy::new(capabilities, PolicySettings::default());

    let turn = policy.step("hello").await;
    assert_eq!(turn.act, SpeechAct::Ask);
    assert_eq!(turn.text, REDIRECT);

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].0.starts_with("You are a Socratic tutor."));
    assert_eq!(prompts[0].1, "[ACT=ASK] User: hello\nTutor:");
}

#[tokio::test]
async fn generator_failure_becomes_inline_error() {
    let capabilities = Capabilities::builder()
        .verifier(Arc::new(CheckNumericClaim::new()))
        .generator(ScriptedGenerator::failing())
        .build()
        .unwrap();
    let mut policy = DialoguePolicy::new(capabilities, PolicySettings::default());

    let turn = policy.step("My goal is to learn.").await;
    assert_eq!(turn.act, SpeechAct::Probe);
    assert_eq!(
        turn.text,
        "[error during PROBE: generator returned no text]"
    );
    assert!(!turn.done);
    assert!(policy.ledger().has_goal());
}

#[tokio::test]
async fn verifier_failure_leaves_trace_untouched() {
    let capabilities = Capabilities::builder()
        .verifier(Arc::new(BrokenVerifier))
        .build()
        .unwrap();
    let mut policy = DialoguePolicy::new(capabilities, PolicySettings::default());
    let mut last = None;
    for message in SCENARIO_ONE {
        last = Some(policy.step(message).await);
    }
    let last = last.unwrap();

    assert_eq!(last.act, SpeechAct::Verify);
    assert_eq!(
        last.text,
        "[error during VERIFY: verification failed: tool crashed]"
    );
    assert!(!last.done);
    assert!(policy.trace().is_empty());
}

#[tokio::test]
async fn rag_lesson_runs_three_phases() {
    let generator = ScriptedGenerator::replying("Clear claim; cite the second passage.");
    let (mut policy, index) = lesson_policy(Some(generator.clone()));

    let start = policy
        .step("RAG[https://a.example/rag, https://b.example/limits]: explain retrieval augmented generation")
        .await;
    assert_eq!(start.act, SpeechAct::Ask);
    assert_eq!(start.stance, Stance::Explore);
    assert!(!start.done);
    assert_eq!(policy.rag_phase(), Some(RagPhase::Elicit));
    assert!(index.is_empty());

    let elicit = policy.step("I think it looks things up first").await;
    assert_eq!(elicit.act, SpeechAct::Verify);
    assert_eq!(elicit.stance, Stance::Verify);
    assert!((elicit.readiness.value() - 0.6).abs() < 1e-9);
    assert!(elicit.text.contains("Top passages for: explain retrieval augmented generation"));
    assert!(elicit.text.contains("Sources:\n- https://a.example/rag"));
    assert_eq!(index.len(), 3);
    assert_eq!(policy.rag_phase(), Some(RagPhase::Synth));

    let synth = policy
        .step("Claim: RAG retrieves passages, then generates. Evidence: passage one.")
        .await;
    assert_eq!(synth.act, SpeechAct::Summarize);
    assert_eq!(synth.stance, Stance::Explore);
    assert!((synth.readiness.value() - 0.65).abs() < 1e-9);
    assert!(synth.text.starts_with("Clear claim; cite the second passage."));
    assert!(synth.text.contains("Quick check:"));
    let prompts = generator.prompts();
    let (_, coach_prompt) = prompts.last().unwrap();
    assert!(coach_prompt.contains("Top passages for:"));
    assert!(coach_prompt.contains("Draft:\nClaim: RAG retrieves passages"));

    let quiz = policy.step("1. lookup then write 2. a.example 3. stale data").await;
    assert_eq!(quiz.act, SpeechAct::Verify);
    assert!((quiz.readiness.value() - 0.7).abs() < 1e-9);
    assert!(quiz.done);
    assert_eq!(policy.rag_phase(), None);

    // Back to ledger logic: no goal yet, so the tutor asks.
    let after = policy.step("RAG is neat").await;
    assert_eq!(after.act, SpeechAct::Ask);
    assert!(!policy.ledger().has_goal());
    assert_eq!(policy.stance(), Stance::Explore);
}

#[tokio::test]
async fn coach_feedback_is_not_filtered() {
    let generator = ScriptedGenerator::replying("Your final answer is approximately right.");
    let (mut policy, _) = lesson_policy(Some(generator));
    policy.step("RAG[https://a.example/rag]: bm25").await;
    policy.step("it ranks").await;
    let synth = policy.step("draft").await;
    assert!(synth.text.starts_with("Your final answer is approximately right."));
}

#[tokio::test]
async fn lesson_survives_unreachable_sources() {
    let (mut policy, index) = lesson_policy(None);
    policy
        .step("RAG[https://down.example, https://b.example/limits]: limits of retrieval")
        .await;
    let elicit = policy.step("not much").await;
    assert_eq!(elicit.act, SpeechAct::Verify);
    assert_eq!(index.len(), 1);
    assert!(elicit.text.contains("(source: https://b.example/limits)"));
    assert!(
        elicit
            .text
            .ends_with("[error during ingest: https://down.example: connection refused]")
    );
}

#[tokio::test]
async fn rag_start_inside_a_lesson_is_lesson_input() {
    let (mut policy, _) = lesson_policy(None);
    policy.step("RAG[https://a.example/rag]: first").await;
    let turn = policy.step("RAG: second").await;
    assert_eq!(turn.act, SpeechAct::Verify);
    assert!(turn.text.starts_with("You said: \"RAG: second\""));
    assert_eq!(policy.rag_phase(), Some(RagPhase::Synth));
}

#[tokio::test]
async fn summarize_never_repeats() {
    let mut policy = offline_policy();
    policy.step("goal: learn").await;
    let mut summaries = 0;
    for i in 0..6 {
        let turn = policy.step(&format!("criterion {i}")).await;
        if turn.act == SpeechAct::Summarize {
            summaries += 1;
        }
    }
    assert_eq!(summaries, 1);
}
