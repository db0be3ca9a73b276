//! Retrieval-grounded lesson over pages served by a mock server.

use socratic_engine::rag::OFFLINE_FEEDBACK;
use socratic_engine::{SpeechAct, Stance};
use wiremock::MockServer;

use crate::common::{mount_page, offline_config, session};

#[tokio::test]
async fn lesson_fetches_sources_and_closes() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/rag",
        "Retrieval",
        "retrieval augmented generation grounds answers in passages",
    )
    .await;
    mount_page(
        &server,
        "/limits",
        "Limits",
        "stale retrieval passages mislead generation",
    )
    .await;
    let rag_url = format!("{}/rag", server.uri());
    let limits_url = format!("{}/limits", server.uri());

    let (mut orchestrator, index) = session(&offline_config());

    let start = orchestrator
        .step(&format!(
            "RAG[{rag_url},{limits_url}]: retrieval augmented generation"
        ))
        .await;
    assert_eq!(start.act, SpeechAct::Ask);
    assert!(index.is_empty());

    let elicit = orchestrator
        .step("I believe it looks things up before answering")
        .await;
    assert_eq!(elicit.act, SpeechAct::Verify);
    assert_eq!(elicit.stance, Stance::Verify);
    assert!(!index.is_empty());
    assert!(elicit.text.contains("Top passages for: retrieval augmented generation"));
    assert!(elicit.text.contains(&format!("- {rag_url}")));

    let synth = orchestrator
        .step("Claim: it retrieves passages first. Evidence: the first source.")
        .await;
    assert_eq!(synth.act, SpeechAct::Summarize);
    assert!(synth.text.starts_with(OFFLINE_FEEDBACK));
    assert!(synth.text.contains("Quick check:"));

    let quiz = orchestrator.step("1. retrieve then generate").await;
    assert_eq!(quiz.act, SpeechAct::Verify);
    assert!((quiz.readiness.value() - 0.7).abs() < 1e-9);
    assert!(quiz.done);
}
