//! Offline sessions wired from configuration, sources served by a mock server.

use socratic_engine::service::NO_CONTEXT;
use socratic_engine::{IngestStatus, SpeechAct, Stance};
use wiremock::MockServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{CIRCLE_CORRECT, mount_page, offline_config, session};

#[tokio::test]
async fn verified_claim_finishes_the_session() {
    let (mut orchestrator, _) = session(&offline_config());

    let mut turns = Vec::new();
    for message in CIRCLE_CORRECT {
        turns.push(orchestrator.step(message).await);
    }

    let acts: Vec<SpeechAct> = turns.iter().map(|turn| turn.act).collect();
    assert_eq!(
        acts,
        [
            SpeechAct::Ask,
            SpeechAct::Probe,
            SpeechAct::Summarize,
            SpeechAct::Verify
        ]
    );
    let last = turns.last().unwrap();
    assert_eq!(last.stance, Stance::Verify);
    assert!(last.text.contains("satisfies=True"));
    assert!(last.done);
    assert_eq!(orchestrator.turns(), 4);
}

#[tokio::test]
async fn ingest_then_ask() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/bm25",
        "Ranking",
        "bm25 ranks passages by term frequency",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (orchestrator, index) = session(&offline_config());
    assert_eq!(orchestrator.ask("how does bm25 rank", None), NO_CONTEXT);

    let good = format!("{}/bm25", server.uri());
    let gone = format!("{}/gone", server.uri());
    let report = orchestrator.ingest(&[good.clone(), gone.clone()]).await;

    assert!(matches!(report.get(&good), Some(IngestStatus::Chunks(n)) if *n > 0));
    assert!(matches!(report.get(&gone), Some(IngestStatus::Failed(_))));
    assert_eq!(report.failures(), 1);
    assert_eq!(index.len(), report.total_chunks());

    let context = orchestrator.ask("how does bm25 rank", Some(1));
    assert!(context.starts_with("Top passages for: how does bm25 rank"));
    assert!(context.contains(&format!("(source: {good})")));

    let again = orchestrator.ingest(&[good.clone()]).await;
    assert_eq!(again.get(&good), Some(&IngestStatus::Chunks(0)));
}
