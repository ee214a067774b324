use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{Level, event, instrument, warn};

/// Maximum characters of a request/response body written to the trace log
const MAX_CONTENT_LOG_CHARS: usize = 200;

fn truncate_for_log(s: &str) -> String {
    match s.char_indices().nth(MAX_CONTENT_LOG_CHARS) {
        Some((idx, _)) => format!("{}... ({} chars total)", &s[..idx], s.chars().count()),
        None => s.to_string(),
    }
}

/// Exponential backoff applied to rate-limited and transient failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based), doubling each time up to `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    fn is_retryable_error(err: &reqwest::Error) -> bool {
        err.is_connect() || err.is_timeout()
    }
}

#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl Client {
    pub fn with_headers(headers: HeaderMap, retry: RetryPolicy) -> anyhow::Result<Self> {
        Ok(Client {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .build()?,
            retry,
        })
    }

    #[instrument(level = "trace", skip(self, request))]
    pub async fn post<U, S, T>(&self, url: U, request: &S) -> anyhow::Result<T>
    where
        U: reqwest::IntoUrl + Clone + std::fmt::Debug,
        S: Serialize + Sized,
        T: DeserializeOwned,
    {
        if tracing::enabled!(Level::TRACE) {
            let json = serde_json::to_string(request).unwrap_or_default();
            event!(Level::TRACE, request = truncate_for_log(&json));
        }

        let response = self
            .send_with_retry(|| self.client.post(url.clone()).json(request))
            .await?;
        Self::decode(response).await
    }

    /// POST a multipart form. The form is rebuilt for every attempt since it cannot be cloned.
    #[instrument(level = "trace", skip(self, build_form))]
    pub async fn post_multipart<U, F, T>(&self, url: U, build_form: F) -> anyhow::Result<T>
    where
        U: reqwest::IntoUrl + Clone + std::fmt::Debug,
        F: Fn() -> anyhow::Result<Form>,
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            let form = build_form()?;
            let request = self.client.post(url.clone()).multipart(form);
            match self.attempt(request, attempt).await? {
                Some(response) => return Self::decode(response).await,
                None => attempt += 1,
            }
        }
    }

    async fn send_with_retry<F>(&self, build: F) -> anyhow::Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match self.attempt(build(), attempt).await? {
                Some(response) => return Ok(response),
                None => attempt += 1,
            }
        }
    }

    /// Sends one attempt. `Ok(None)` means the caller should try again after the backoff
    /// this function already slept.
    async fn attempt(
        &self,
        request: RequestBuilder,
        attempt: u32,
    ) -> anyhow::Result<Option<Response>> {
        let can_retry = attempt < self.retry.max_retries;
        match request.send().await {
            Ok(response) if response.status().is_success() => Ok(Some(response)),
            Ok(response) if can_retry && RetryPolicy::is_retryable_status(response.status()) => {
                let delay = retry_after(&response)
                    .map(|d| d.min(self.retry.max_backoff))
                    .unwrap_or_else(|| self.retry.backoff(attempt));
                warn!(
                    status = %response.status(),
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Provider request throttled or failed, retrying"
                );
                tokio::time::sleep(delay).await;
                Ok(None)
            }
            Ok(response) => {
                let status = response.status();
                let error_body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error body".to_string());
                Err(anyhow::anyhow!(
                    "Request failed with status {}: {}",
                    status,
                    error_body
                ))
            }
            Err(e) if can_retry && RetryPolicy::is_retryable_error(&e) => {
                let delay = self.retry.backoff(attempt);
                warn!(
                    error = %e,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Provider unreachable, retrying"
                );
                tokio::time::sleep(delay).await;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
        let text = response.text().await?;
        event!(Level::TRACE, response = truncate_for_log(&text));
        Ok(serde_json::from_str::<T>(&text)?)
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_until_cap() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(500),
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(policy.backoff(3), Duration::from_millis(500));
        assert_eq!(policy.backoff(40), Duration::from_millis(500));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(RetryPolicy::is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(RetryPolicy::is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(RetryPolicy::is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!RetryPolicy::is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!RetryPolicy::is_retryable_status(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_no_retry_policy() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.max_retries, 0);
    }

    #[test]
    fn test_truncate_for_log() {
        let short = "select 1";
        assert_eq!(truncate_for_log(short), short);

        let long = "á".repeat(MAX_CONTENT_LOG_CHARS + 10);
        let truncated = truncate_for_log(&long);
        assert!(truncated.ends_with(&format!("({} chars total)", MAX_CONTENT_LOG_CHARS + 10)));
        assert!(truncated.starts_with(&"á".repeat(MAX_CONTENT_LOG_CHARS)));
    }

    #[test]
    fn test_client_with_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-test", "value".parse().unwrap());
        assert!(Client::with_headers(headers, RetryPolicy::default()).is_ok());
    }
}
