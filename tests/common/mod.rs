//! Shared test utilities and fixtures

#![allow(dead_code)]

use socratic_engine::{Orchestrator, SharedIndex, SocraticConfig, orchestrator_from_config};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CIRCLE_CORRECT: [&str; 4] = [
    "I think the area of a circle with r=3 is 28.",
    "My goal is to check if my rule works.",
    "A criterion: plug r=3 into pi*r^2.",
    "Please verify the criterion now.",
];

/// Parse a TOML config the way the binary would read it from disk.
pub fn config(toml_src: &str) -> SocraticConfig {
    toml::from_str(toml_src).expect("test config parses")
}

pub fn offline_config() -> SocraticConfig {
    config("[app]\noffline = true\n[webfetch]\nchunk_words = 12\nchunk_overlap = 2\ntimeout_seconds = 5\n")
}

pub fn session(config: &SocraticConfig) -> (Orchestrator, SharedIndex) {
    let index = SharedIndex::new(config.retrieval().bm25_params());
    let orchestrator = orchestrator_from_config(config, index.clone()).expect("wiring succeeds");
    (orchestrator, index)
}

pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body><main><h1>{title}</h1><p>{body}</p></main></body></html>"
    )
}

pub async fn mount_page(server: &MockServer, route: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page(title, body), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Mount an OpenAI-style chat completion that always returns `content`.
pub async fn mount_chat_reply(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(server)
        .await;
}
