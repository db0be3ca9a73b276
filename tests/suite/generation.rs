//! Sessions backed by a mocked chat-completion provider.

use std::sync::Arc;

use socratic_engine::deference::REDIRECT;
use socratic_engine::{Capabilities, Orchestrator, PolicySettings, ProviderGenerator, SpeechAct};
use socratic_providers::ApiConfig;
use socratic_providers::retry::RetryConfig;
use socratic_tools::CheckNumericClaim;
use socratic_types::{ApiKey, Provider};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{CIRCLE_CORRECT, mount_chat_reply};

fn orchestrator(server: &MockServer) -> Orchestrator {
    let config = ApiConfig::new(
        ApiKey::new(Provider::OpenAI, "sk-test"),
        Provider::OpenAI.default_model(),
    )
    .unwrap()
    .with_endpoint(format!("{}/v1/chat/completions", server.uri()));
    let generator = ProviderGenerator::new(config).with_retry(RetryConfig::none());
    let capabilities = Capabilities::builder()
        .verifier(Arc::new(CheckNumericClaim::new()))
        .generator(Arc::new(generator))
        .build()
        .unwrap();
    Orchestrator::new(capabilities, PolicySettings::default())
}

#[tokio::test]
async fn generated_questions_reach_the_learner() {
    let server = MockServer::start().await;
    mount_chat_reply(&server, "What would convince you the rule holds?").await;

    let mut session = orchestrator(&server);
    let turn = session.step(CIRCLE_CORRECT[0]).await;
    assert_eq!(turn.act, SpeechAct::Ask);
    assert_eq!(turn.text, "What would convince you the rule holds?");
}

#[tokio::test]
async fn generated_answers_are_redirected() {
    let server = MockServer::start().await;
    mount_chat_reply(&server, "The final answer is 28.27.").await;

    let mut session = orchestrator(&server);
    let turn = session.step(CIRCLE_CORRECT[0]).await;
    assert_eq!(turn.text, REDIRECT);
}

#[tokio::test]
async fn verification_does_not_call_the_provider() {
    let server = MockServer::start().await;
    mount_chat_reply(&server, "Which case would you check?").await;

    let mut session = orchestrator(&server);
    let mut last = None;
    for message in CIRCLE_CORRECT {
        last = Some(session.step(message).await);
    }
    let last = last.unwrap();
    assert_eq!(last.act, SpeechAct::Verify);
    assert!(last.text.contains("satisfies=True"));

    // ASK, PROBE and SUMMARIZE may generate; VERIFY never does.
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() <= 3);
}

#[tokio::test]
async fn provider_failure_is_reported_in_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let mut session = orchestrator(&server);
    let turn = session.step(CIRCLE_CORRECT[0]).await;
    assert_eq!(turn.act, SpeechAct::Ask);
    assert!(turn.text.starts_with("[error during ASK:"), "{}", turn.text);
    assert!(!turn.done);
}
