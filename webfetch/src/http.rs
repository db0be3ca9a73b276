//! HTTP fetching with a capped body and the Wikipedia REST fallback.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::redirect::Policy;
use tracing::{debug, warn};
use url::Url;

use crate::types::{ErrorCode, WebFetchConfig, WebFetchError};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en;q=0.9";

/// Body and metadata of a successful response.
#[derive(Debug, Clone)]
pub struct HttpPage {
    pub final_url: Url,
    pub body: String,
    pub is_html: bool,
    pub used_fallback: bool,
}

pub fn build_client(config: &WebFetchConfig) -> Result<reqwest::Client, WebFetchError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(u64::from(config.timeout_seconds())))
        .redirect(Policy::limited(config.max_redirects() as usize))
        .build()
        .map_err(|e| {
            WebFetchError::new(
                ErrorCode::BadArgs,
                format!("failed to build HTTP client: {e}"),
                false,
            )
        })
}

pub fn parse_url(raw: &str) -> Result<Url, WebFetchError> {
    if raw.trim().is_empty() {
        return Err(WebFetchError::new(
            ErrorCode::BadArgs,
            "url must not be empty or whitespace-only",
            false,
        )
        .with_detail("field", "url"));
    }

    let url = Url::parse(raw.trim()).map_err(|e| {
        WebFetchError::new(
            ErrorCode::InvalidUrl,
            format!("failed to parse URL: {e}"),
            false,
        )
        .with_detail("url", raw)
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(WebFetchError::new(
            ErrorCode::InvalidScheme,
            format!("unsupported scheme: {}", url.scheme()),
            false,
        )
        .with_detail("url", raw));
    }

    Ok(url)
}

/// REST HTML endpoint for a `*.wikipedia.org/wiki/<title>` article on the same host.
#[must_use]
pub fn wikipedia_rest_url(url: &Url) -> Option<Url> {
    let host = url.host_str()?;
    if !(host == "wikipedia.org" || host.ends_with(".wikipedia.org")) {
        return None;
    }
    let title = url.path().strip_prefix("/wiki/")?;
    if title.is_empty() {
        return None;
    }
    Url::parse(&format!(
        "{}://{host}/api/rest_v1/page/html/{title}",
        url.scheme()
    ))
    .ok()
}

/// GET `url`, retrying once through the Wikipedia REST endpoint when the
/// article page answers 403 or 429.
pub async fn fetch(
    client: &reqwest::Client,
    url: &Url,
    config: &WebFetchConfig,
) -> Result<HttpPage, WebFetchError> {
    match fetch_once(client, url, config).await {
        Err(err) if is_blocked(&err) => {
            let Some(rest_url) = wikipedia_rest_url(url) else {
                return Err(err);
            };
            warn!(url = %url, status = err.detail("status"), "Article blocked; retrying via REST endpoint");
            let mut page = fetch_once(client, &rest_url, config).await?;
            page.used_fallback = true;
            Ok(page)
        }
        other => other,
    }
}

fn is_blocked(err: &WebFetchError) -> bool {
    err.code == ErrorCode::Http4xx && matches!(err.detail("status"), Some("403" | "429"))
}

async fn fetch_once(
    client: &reqwest::Client,
    url: &Url,
    config: &WebFetchConfig,
) -> Result<HttpPage, WebFetchError> {
    debug!(url = %url, "GET");
    let response = client
        .get(url.clone())
        .header(ACCEPT, ACCEPT_HTML)
        .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_EN)
        .send()
        .await
        .map_err(|e| request_error(&e, url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status, url));
    }

    let final_url = {
        let mut final_url = response.url().clone();
        final_url.set_fragment(None);
        final_url
    };

    let media_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase()
        });
    let is_html = match media_type.as_deref() {
        None | Some("text/html" | "application/xhtml+xml" | "application/xml" | "text/xml") => true,
        Some(mt) if mt.starts_with("text/") => false,
        Some(mt) => {
            return Err(WebFetchError::new(
                ErrorCode::UnsupportedContentType,
                format!("unsupported content type: {mt}"),
                false,
            )
            .with_detail("content_type", mt));
        }
    };

    let max_bytes = config.max_download_bytes();
    if let Some(len) = response.content_length()
        && len > max_bytes
    {
        return Err(too_large(len, max_bytes));
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            WebFetchError::new(
                ErrorCode::Network,
                format!("response stream error: {e}"),
                true,
            )
            .with_detail("error", e.to_string())
        })?;
        let size = (body.len() + chunk.len()) as u64;
        if size > max_bytes {
            return Err(too_large(size, max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(HttpPage {
        final_url,
        body: String::from_utf8_lossy(&body).into_owned(),
        is_html,
        used_fallback: false,
    })
}

fn request_error(err: &reqwest::Error, url: &Url) -> WebFetchError {
    if err.is_timeout() {
        WebFetchError::new(ErrorCode::Timeout, "request timed out", true)
            .with_detail("url", url.as_str())
    } else if err.is_redirect() {
        WebFetchError::new(ErrorCode::RedirectLimit, "redirect limit exceeded", false)
            .with_detail("url", url.as_str())
    } else {
        WebFetchError::new(ErrorCode::Network, format!("request failed: {err}"), true)
            .with_detail("url", url.as_str())
    }
}

fn status_error(status: StatusCode, url: &Url) -> WebFetchError {
    let (code, retryable) = if status.is_server_error() {
        (ErrorCode::Http5xx, true)
    } else {
        (ErrorCode::Http4xx, matches!(status.as_u16(), 408 | 429))
    };
    WebFetchError::new(code, format!("HTTP {}", status.as_u16()), retryable)
        .with_detail("status", status.as_u16().to_string())
        .with_detail(
            "status_text",
            status.canonical_reason().unwrap_or("").to_string(),
        )
        .with_detail("url", url.as_str())
}

fn too_large(size: u64, max_bytes: u64) -> WebFetchError {
    WebFetchError::new(
        ErrorCode::ResponseTooLarge,
        "response exceeds size limit",
        false,
    )
    .with_detail("size", size.to_string())
    .with_detail("max_bytes", max_bytes.to_string())
}
