//! GET requests wrapped in [`seatbelt`] retry and timeout middleware.

use crate::Result;
use core::time::Duration;
use layered::{Execute, Service, Stack};
use ohno::{IntoAppError, app_err};
use reqwest::{Client, Response, StatusCode, header::HeaderMap};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

const LOG_TARGET: &str = "      http";

/// Timeout for a single request attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum retry attempts on top of the original request.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Delay used for a 429 response without a usable `Retry-After` header.
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let s = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    s.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Classify a request outcome for the retry layer.
fn classify(result: &Result<Response>) -> RecoveryInfo {
    match result {
        // network errors and timeouts
        Err(_) => RecoveryInfo::retry(),

        Ok(resp) if resp.status().is_server_error() => RecoveryInfo::retry(),

        Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
            RecoveryInfo::retry().delay(parse_retry_after(resp.headers()).unwrap_or(DEFAULT_RATE_LIMIT_DELAY))
        }

        // secondary rate limit
        Ok(resp) if resp.status() == StatusCode::FORBIDDEN => {
            parse_retry_after(resp.headers()).map_or_else(RecoveryInfo::never, |delay| RecoveryInfo::retry().delay(delay))
        }

        _ => RecoveryInfo::never(),
    }
}

/// Send a GET request, retrying transient failures with exponential backoff from `base_delay`.
///
/// Network errors, timeouts, 5xx responses, and 429 responses are retried. Any other
/// response, including 4xx client errors, is returned as-is for the caller to interpret.
pub async fn resilient_get(client: &Client, url: &str, base_delay: Duration) -> Result<Response> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("registry_get");

    let client = client.clone();
    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &Result<Response>, _| classify(result))
            .max_retry_attempts(MAX_RETRY_ATTEMPTS)
            .base_delay(base_delay)
            .backoff(Backoff::Exponential)
            .on_retry(|_output, args| {
                log::debug!(
                    target: LOG_TARGET,
                    "Retrying GET (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis()
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(|_| app_err!("request timed out after {} seconds", REQUEST_TIMEOUT.as_secs()))
            .timeout(REQUEST_TIMEOUT),
        Execute::new(move |url: String| {
            let client = client.clone();
            async move { client.get(&url).send().await.into_app_err_with(|| format!("requesting '{url}'")) }
        }),
    )
        .into_service();

    service.execute(url.to_string()).await
}
