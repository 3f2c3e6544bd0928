use crate::config::Config;
use reqwest::{Client, StatusCode};
use skinage_core::prediction::parse_reply;
use skinage_core::{PredictionRequest, PredictionResponse, ReplyError};
use std::time::Duration;

/// Cap on the delay between retries.
const MAX_BACKOFF_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Reply(#[from] ReplyError),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// What to do with a reply that arrived.
#[derive(Debug)]
enum Outcome {
    Done(Result<PredictionResponse, ClientError>),
    Retry(String),
}

#[derive(Clone)]
pub struct PredictionClient {
    client: Client,
    url: String,
    max_retries: u32,
    /// Delay unit scaled by [`backoff_secs`].
    backoff_unit: Duration,
}

impl PredictionClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.service_url.clone(),
            max_retries: config.max_retries,
            backoff_unit: Duration::from_secs(1),
        })
    }

    #[cfg(test)]
    fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Submit a capture, retrying connect failures, timeouts, truncated
    /// bodies and 5xx replies.
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ClientError> {
        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff_secs = backoff_secs(attempt);
                tracing::warn!(attempt, backoff_secs, %last_error, "retrying after backoff");
                tokio::time::sleep(self.backoff_unit * backoff_secs as u32).await;
            }

            let response = match self.client.post(&self.url).json(request).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(ClientError::Request(e));
                }
            };

            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_body() {
                        continue;
                    }
                    return Err(ClientError::Request(e));
                }
            };
            tracing::debug!(%status, bytes = body.len(), "prediction reply received");

            match classify(status, &body) {
                Outcome::Done(result) => return result,
                Outcome::Retry(reason) => last_error = reason,
            }
        }

        Err(ClientError::MaxRetriesExceeded {
            attempts: self.max_retries + 1,
            last_error,
        })
    }
}

/// Exponential backoff in seconds for retry `attempt` (1-based).
fn backoff_secs(attempt: u32) -> u64 {
    1u64.checked_shl(attempt)
        .unwrap_or(MAX_BACKOFF_SECS)
        .min(MAX_BACKOFF_SECS)
}

/// Map a reply to a result. Service-reported `{"error": ...}` messages win
/// over the bare HTTP status.
fn classify(status: StatusCode, body: &str) -> Outcome {
    if status.is_success() {
        return Outcome::Done(parse_reply(body).map_err(ClientError::from));
    }
    if status.is_server_error() {
        let reason = match parse_reply(body) {
            Err(ReplyError::Service(message)) => format!("{status}: {message}"),
            _ => format!("{status}: {body}"),
        };
        return Outcome::Retry(reason);
    }
    match parse_reply(body) {
        Err(e @ ReplyError::Service(_)) => Outcome::Done(Err(e.into())),
        _ => Outcome::Done(Err(ClientError::Http {
            status,
            body: body.to_string(),
        })),
    }
}
