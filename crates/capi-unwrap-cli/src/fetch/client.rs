//! Async HTTP client wrapping reqwest.
//!
//! Every attempt captures its own timestamp, sends it with browser-like
//! headers, and unwraps the response. Retries on transport errors, 5xx and
//! 429 start a whole new attempt because key material is timestamp-bound.

use std::time::Duration;

use capi_unwrap::timestamp::now_millis;
use capi_unwrap::{unwrap_exchange, ApiResponse, Exchange};

use super::{FetchError, FetchResult};
use crate::config::FetchConfig;

/// Longest wait honoured from a `retry-after` header.
const MAX_RETRY_AFTER_SECS: u64 = 10;

/// Result of a successful fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Recovered plaintext.
    pub text: String,
    /// Attempts used, including the successful one.
    pub attempts: u32,
    /// Timestamp of the successful attempt.
    pub timestamp_millis: u64,
}

/// HTTP client for obfuscated endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: FetchConfig,
}

impl ApiClient {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch `url` and return the recovered plaintext.
    pub async fn fetch(&self, url: &str) -> FetchResult<Fetched> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let timestamp_millis = now_millis();

            match self.attempt(url, timestamp_millis).await {
                Ok(text) => {
                    tracing::info!(url, attempts, bytes = text.len(), "fetch succeeded");
                    return Ok(Fetched {
                        text,
                        attempts,
                        timestamp_millis,
                    });
                }
                Err(e) if e.is_retryable() && attempts < max_attempts => {
                    let delay = backoff(&e, attempts);
                    tracing::warn!(url, attempts, ?delay, "attempt failed, retrying: {e}");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(url, attempts, "fetch failed: {e}");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(&self, url: &str, timestamp_millis: u64) -> FetchResult<String> {
        let mut builder = self.client.get(url);
        for (name, value) in self.request_headers(timestamp_millis) {
            builder = builder.header(name, value);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        if status != 200 {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(FetchError::Status {
                status,
                retry_after,
            });
        }

        let key_envelope = resp
            .headers()
            .get(self.config.key_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if key_envelope.is_none() {
            tracing::debug!(header = %self.config.key_header, "response has no key envelope");
        }

        let body = resp.bytes().await?;
        let response = ApiResponse::from_json(&body)?;
        if !response.success {
            tracing::warn!(code = %response.code, msg = %response.msg, "response not flagged as success");
        }

        let exchange = Exchange::new(timestamp_millis, key_envelope, &response);
        Ok(unwrap_exchange(&exchange)?)
    }

    /// Headers for one attempt. The timestamp header and `encryption: true`
    /// make the server return recoverable envelopes.
    pub fn request_headers(&self, timestamp_millis: u64) -> Vec<(String, String)> {
        let c = &self.config;
        [
            ("accept", "application/json".to_string()),
            ("accept-language", c.accept_language.clone()),
            (c.timestamp_header.as_str(), timestamp_millis.to_string()),
            ("encryption", "true".to_string()),
            ("language", c.language.clone()),
            ("origin", c.origin.clone()),
            ("priority", "u=1, i".to_string()),
            ("referer", c.referer.clone()),
            (
                "sec-ch-ua",
                r#""Not)A;Brand";v="8", "Chromium";v="138", "Google Chrome";v="138""#.to_string(),
            ),
            ("sec-ch-ua-mobile", "?0".to_string()),
            ("sec-ch-ua-platform", r#""Windows""#.to_string()),
            ("sec-fetch-dest", "empty".to_string()),
            ("sec-fetch-mode", "cors".to_string()),
            ("sec-fetch-site", "same-site".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

fn backoff(err: &FetchError, attempts: u32) -> Duration {
    if let FetchError::Status {
        status: 429,
        retry_after,
    } = err
    {
        return Duration::from_secs(retry_after.unwrap_or(2).min(MAX_RETRY_AFTER_SECS));
    }
    Duration::from_millis(500 * 2u64.pow(attempts.saturating_sub(1).min(6)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_carry_timestamp_and_marker() {
        let client = ApiClient::new(FetchConfig::default()).unwrap();
        let headers = client.request_headers(1_700_000_000_000);
        assert!(headers.contains(&("cache-ts-v2".into(), "1700000000000".into())));
        assert!(headers.contains(&("encryption".into(), "true".into())));
    }

    #[test]
    fn test_backoff_grows_and_honours_retry_after() {
        let server_err = FetchError::Status {
            status: 503,
            retry_after: None,
        };
        assert_eq!(backoff(&server_err, 1), Duration::from_millis(500));
        assert_eq!(backoff(&server_err, 2), Duration::from_millis(1000));

        let limited = FetchError::Status {
            status: 429,
            retry_after: Some(60),
        };
        assert_eq!(backoff(&limited, 1), Duration::from_secs(10));
    }

    #[test]
    fn test_client_errors_not_retryable() {
        let err = FetchError::Status {
            status: 404,
            retry_after: None,
        };
        assert!(!err.is_retryable());
    }
}
