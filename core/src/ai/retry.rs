/// Retry decisions for collaborator HTTP calls.
///
/// The pipeline itself never retries a step; this policy only governs
/// repeated attempts of a single request inside the OpenAI client.
use reqwest::StatusCode;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay before the first retry attempt.
    pub base_delay: Duration,
    /// Cap applied to every delay, including server-provided hints.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: 2,
        }
    }
}

/// Failure classes that influence the decision.
#[derive(Debug, Clone, Copy)]
pub enum RetryClass {
    /// HTTP failure with a status code and an optional `Retry-After` hint.
    Http {
        status: StatusCode,
        retry_after: Option<Duration>,
    },
    /// Transport-level failure without a status code.
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    pub should_retry: bool,
    pub delay: Duration,
}

impl RetryDecision {
    const fn give_up() -> Self {
        Self {
            should_retry: false,
            delay: Duration::from_millis(0),
        }
    }
}

/// Decide whether to retry after a failed attempt.
///
/// `previous_attempts` counts the retries already made. A server-provided
/// `Retry-After` hint wins over exponential backoff; both are capped at
/// `max_delay`.
pub fn evaluate_retry(
    class: RetryClass,
    policy: RetryPolicy,
    previous_attempts: u32,
) -> RetryDecision {
    if previous_attempts >= policy.max_retries {
        return RetryDecision::give_up();
    }

    match class {
        RetryClass::Http { status, .. } if !is_retryable_status(status) => {
            RetryDecision::give_up()
        }
        RetryClass::Http {
            retry_after: Some(hint),
            ..
        } => RetryDecision {
            should_retry: true,
            delay: hint.min(policy.max_delay),
        },
        RetryClass::Http { .. } | RetryClass::Network => RetryDecision {
            should_retry: true,
            delay: exponential_backoff(policy, previous_attempts),
        },
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn exponential_backoff(policy: RetryPolicy, previous_attempts: u32) -> Duration {
    let base_ms = policy.base_delay.as_millis() as u64;
    let multiplier = 1u64 << previous_attempts.min(16);
    Duration::from_millis(base_ms.saturating_mul(multiplier)).min(policy.max_delay)
}

/// Parse an HTTP `Retry-After` header value: either delta seconds or an
/// HTTP-date. Returns `None` when the value is unparsable.
pub fn parse_retry_after(value: &str, now: SystemTime) -> Option<Duration> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    if let Ok(instant) = httpdate::parse_http_date(trimmed) {
        return Some(instant.duration_since(now).unwrap_or(Duration::from_secs(0)));
    }

    None
}
