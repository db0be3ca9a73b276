//! Anthropic Messages API (non-streaming).
//!
//! Response format: `{ "content": [{ "type": "text", "text": "..." }] }`

use serde_json::json;

use crate::retry::{RetryConfig, send_with_retry};
use crate::{ApiConfig, GenerateRequest, ProviderError, http_client_with_timeout, into_json};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[must_use]
pub fn build_body(model: &str, request: &GenerateRequest<'_>) -> serde_json::Value {
    json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "stream": false,
        "system": request.system,
        "messages": [
            { "role": "user", "content": request.user }
        ],
    })
}

/// Concatenated text blocks, trimmed. `None` when there are none.
pub fn extract_text(json: &serde_json::Value) -> Option<String> {
    let blocks = json["content"].as_array()?;
    let text: String = blocks
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect();
    let has_text = blocks.iter().any(|block| block["type"] == "text");
    has_text.then(|| text.trim().to_string())
}

pub async fn generate(
    config: &ApiConfig,
    request: &GenerateRequest<'_>,
    retry_config: &RetryConfig,
) -> Result<String, ProviderError> {
    let client = http_client_with_timeout(config.timeout_secs()).map_err(ProviderError::Client)?;
    let body = build_body(config.model().as_str(), request);
    let endpoint = config.endpoint();

    tracing::debug!(model = config.model().as_str(), "Claude messages request");

    let outcome = send_with_retry(
        || {
            client
                .post(endpoint)
                .header("x-api-key", config.api_key())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
        },
        retry_config,
    )
    .await;

    let json = into_json(config.provider(), outcome).await?;
    extract_text(&json).ok_or_else(|| ProviderError::MalformedResponse {
        provider: config.provider(),
        detail: format!("no text content block: {json}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{build_body, extract_text};
    use crate::GenerateRequest;
    use serde_json::json;

    #[test]
    fn system_is_top_level() {
        let body = build_body("claude-x", &GenerateRequest::new("sys", "msg"));
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["content"], "msg");
    }

    #[test]
    fn joins_text_blocks() {
        let json = json!({ "content": [
            { "type": "text", "text": "Which " },
            { "type": "tool_use", "id": "t" },
            { "type": "text", "text": "criterion?" }
        ]});
        assert_eq!(extract_text(&json).as_deref(), Some("Which criterion?"));
        assert_eq!(extract_text(&json!({ "content": [] })), None);
    }
}
