//! OpenAI-compatible Chat Completions.
//!
//! Request: `{ model, messages: [system, user], max_tokens, temperature, stream: false }`
//! Response: `{ choices: [{ message: { content } }] }`

use serde_json::json;

use crate::retry::{RetryConfig, send_with_retry};
use crate::{ApiConfig, GenerateRequest, ProviderError, http_client_with_timeout, into_json};

#[must_use]
pub fn build_body(model: &str, request: &GenerateRequest<'_>) -> serde_json::Value {
    json!({
        "model": model,
        "stream": false,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
    })
}

/// First choice's message content, trimmed.
pub fn extract_text(json: &serde_json::Value) -> Option<String> {
    json["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .and_then(|choice| choice["message"]["content"].as_str())
        .map(|text| text.trim().to_string())
}

pub async fn generate(
    config: &ApiConfig,
    request: &GenerateRequest<'_>,
    retry_config: &RetryConfig,
) -> Result<String, ProviderError> {
    let client = http_client_with_timeout(config.timeout_secs()).map_err(ProviderError::Client)?;
    let body = build_body(config.model().as_str(), request);
    let endpoint = config.endpoint();

    tracing::debug!(
        provider = config.provider().as_str(),
        model = config.model().as_str(),
        "Chat completion request"
    );

    let outcome = send_with_retry(
        || {
            client
                .post(endpoint)
                .bearer_auth(config.api_key())
                .header("content-type", "application/json")
                .json(&body)
        },
        retry_config,
    )
    .await;

    let json = into_json(config.provider(), outcome).await?;
    extract_text(&json).ok_or_else(|| ProviderError::MalformedResponse {
        provider: config.provider(),
        detail: format!("missing choices[0].message.content: {json}"),
    })
}

#[cfg(test)]
mod tests {
    use super::{build_body, extract_text};
    use crate::GenerateRequest;
    use serde_json::json;

    #[test]
    fn body_has_system_then_user() {
        let body = build_body("m", &GenerateRequest::new("be socratic", "hi"));
        assert_eq!(body["model"], "m");
        assert_eq!(body["stream"], false);
        assert_eq!(body["max_tokens"], 128);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be socratic");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn extracts_first_choice() {
        let json = json!({ "choices": [{ "message": { "content": "  What do you think?\n" } }] });
        assert_eq!(extract_text(&json).as_deref(), Some("What do you think?"));
        assert_eq!(extract_text(&json!({ "choices": [] })), None);
        assert_eq!(extract_text(&json!({})), None);
    }
}
