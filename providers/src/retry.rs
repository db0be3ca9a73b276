//! Bounded retries for generation requests.
//!
//! Retried: HTTP 408, 409, 429 and 5xx, plus connect/timeout failures.
//! Backoff doubles from `initial_delay` up to `max_delay` and is jittered
//! downwards by at most `jitter_factor`. A server-sent `Retry-After`
//! (or `Retry-After-Ms`) under one minute replaces the computed delay.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::time::sleep;
use uuid::Uuid;

const MAX_SERVER_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Fraction in `[0, 1]` the delay may be shortened by.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_factor: 0.25,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Jittered exponential delay after failed attempt `step` (0-based).
    #[must_use]
    pub fn backoff(&self, step: u32) -> Duration {
        let factor = 2.0_f64.powi(step.min(30) as i32);
        let ceiling = self.max_delay.as_secs_f64();
        let base = (self.initial_delay.as_secs_f64() * factor).min(ceiling);
        let shrink = rand::random::<f64>() * self.jitter_factor.clamp(0.0, 1.0);
        Duration::from_secs_f64(base * (1.0 - shrink))
    }

    fn delay(&self, step: u32, headers: Option<&HeaderMap>) -> Duration {
        headers
            .and_then(retry_after)
            .unwrap_or_else(|| self.backoff(step))
    }
}

/// Server-requested delay, if present and within `(0, 60s)`.
#[must_use]
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let from_ms = header(headers, "retry-after-ms")
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| Duration::from_secs_f64(ms / 1000.0));
    let from_secs = || {
        header(headers, "retry-after")
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
    };

    from_ms
        .or_else(from_secs)
        .filter(|delay| !delay.is_zero() && *delay < MAX_SERVER_DELAY)
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name)?.to_str().ok().map(str::trim)
}

/// Whether a failed status is worth another attempt. An explicit
/// `x-should-retry: true|false` from the server wins.
#[must_use]
pub fn is_retryable(status: StatusCode, headers: &HeaderMap) -> bool {
    let hint = headers
        .get("x-should-retry")
        .and_then(|value| value.to_str().ok());
    match hint {
        Some(v) if v.eq_ignore_ascii_case("true") => true,
        Some(v) if v.eq_ignore_ascii_case("false") => false,
        _ => {
            status.is_server_error()
                || status == StatusCode::REQUEST_TIMEOUT
                || status == StatusCode::CONFLICT
                || status == StatusCode::TOO_MANY_REQUESTS
        }
    }
}

#[derive(Debug)]
pub enum RetryOutcome {
    Success(Response),
    /// Non-2xx status that was not retryable or ran out of retries.
    HttpError(Response),
    /// Transport failure on every attempt.
    ConnectionError {
        attempts: u32,
        source: reqwest::Error,
    },
    /// Transport failure that another attempt would repeat.
    NonRetryable(reqwest::Error),
}

enum Step {
    Finish(RetryOutcome),
    Wait(Duration),
}

fn judge(
    result: Result<Response, reqwest::Error>,
    attempt: u32,
    config: &RetryConfig,
) -> Step {
    let exhausted = attempt >= config.max_retries;
    match result {
        Ok(response) if response.status().is_success() => Step::Finish(RetryOutcome::Success(response)),
        Ok(response) => {
            if exhausted || !is_retryable(response.status(), response.headers()) {
                return Step::Finish(RetryOutcome::HttpError(response));
            }
            let delay = config.delay(attempt, Some(response.headers()));
            tracing::debug!(
                status = response.status().as_u16(),
                attempt = attempt + 1,
                delay_ms = delay.as_millis(),
                "Retrying after error status"
            );
            Step::Wait(delay)
        }
        Err(e) if !(e.is_connect() || e.is_timeout() || e.is_request()) => {
            Step::Finish(RetryOutcome::NonRetryable(e))
        }
        Err(e) if exhausted => Step::Finish(RetryOutcome::ConnectionError {
            attempts: attempt + 1,
            source: e,
        }),
        Err(e) => {
            let delay = config.delay(attempt, None);
            tracing::debug!(
                error = %e,
                attempt = attempt + 1,
                delay_ms = delay.as_millis(),
                "Retrying after transport error"
            );
            Step::Wait(delay)
        }
    }
}

/// Send the request built by `build`, retrying per `config`. All attempts
/// share one `Idempotency-Key`.
pub async fn send_with_retry<F>(build: F, config: &RetryConfig) -> RetryOutcome
where
    F: Fn() -> RequestBuilder,
{
    let key = Uuid::new_v4().to_string();
    let mut attempt = 0;
    loop {
        let result = build().header("Idempotency-Key", &key).send().await;
        match judge(result, attempt, config) {
            Step::Finish(outcome) => return outcome,
            Step::Wait(delay) => sleep(delay).await,
        }
        attempt += 1;
    }
}
