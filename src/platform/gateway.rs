//! Rate-limited request gateway
//!
//! All outbound REST calls from the wall and feed clients go through the
//! gateway, which paces requests with an exponential backoff delay, retries
//! transient failures up to an attempt budget, honors remote rate-limit
//! responses with an extra pause, and short-circuits on fatal error codes.
//! Retries are invisible to callers except through elapsed time.

use crate::config::HarvestConfig;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Classification of one remote response, supplied per platform
#[derive(Debug, Clone)]
pub enum RemoteStatus {
    /// The response carries usable data
    Ok,

    /// The platform asked us to slow down; retry after an extra pause
    RateLimited,

    /// Auth/permission/invalid-request class error; never retried
    Fatal { code: i64, message: String },

    /// Anything else remote-side; retried silently within the budget
    Transient { message: String },
}

/// Gateway-level failures surfaced to platform clients
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Fatal remote error {code}: {message}")]
    FatalRemote { code: i64, message: String },

    #[error("Request failed after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Pacing and retry parameters for outbound calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before the first attempt; multiplied by the backoff factor on
    /// each subsequent attempt
    pub base_delay: Duration,

    /// Exponential backoff multiplier
    pub backoff_factor: f64,

    /// Attempt budget per logical call
    pub max_attempts: u32,

    /// Extra pause after a remote rate-limit response, grown by one second
    /// per attempt already spent
    pub rate_limit_pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(340),
            backoff_factor: 2.0,
            max_attempts: 3,
            rate_limit_pause: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from the harvest configuration
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            backoff_factor: config.backoff_factor,
            max_attempts: config.max_attempts,
            rate_limit_pause: Duration::from_secs(1),
        }
    }
}

/// Rate-limited HTTP gateway shared by the REST-style platform clients
pub struct Gateway {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl Gateway {
    /// Creates a gateway with its own HTTP client
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Client`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(policy: RetryPolicy) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, policy })
    }

    /// Performs one logical GET call with pacing, backoff and retries
    ///
    /// Before every attempt the gateway sleeps
    /// `base_delay * backoff_factor^attempt`. The caller-supplied `classify`
    /// function inspects the JSON body:
    ///
    /// * `Ok` - the body is returned as-is
    /// * `RateLimited` - extra pause, then retry (consumes an attempt)
    /// * `Fatal` - immediate typed failure, no further attempts
    /// * `Transient` - retried silently, like transport-level failures
    ///
    /// # Errors
    ///
    /// * [`GatewayError::FatalRemote`] on a fatal remote error code
    /// * [`GatewayError::AttemptsExhausted`] once the attempt budget is spent
    pub async fn call<F>(&self, url: Url, classify: F) -> Result<Value, GatewayError>
    where
        F: Fn(&Value) -> RemoteStatus,
    {
        for attempt in 0..self.policy.max_attempts {
            tokio::time::sleep(self.pacing_delay(attempt)).await;

            let response = match self.client.get(url.clone()).send().await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Network error calling {}: {}", url, e);
                    continue;
                }
            };

            let body: Value = match response.json().await {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!("Unparseable response from {}: {}", url, e);
                    continue;
                }
            };

            match classify(&body) {
                RemoteStatus::Ok => return Ok(body),
                RemoteStatus::RateLimited => {
                    let pause =
                        self.policy.rate_limit_pause + Duration::from_secs(u64::from(attempt));
                    tracing::warn!("Rate limited by {}, pausing {:?}", url.host_str().unwrap_or("remote"), pause);
                    tokio::time::sleep(pause).await;
                }
                RemoteStatus::Fatal { code, message } => {
                    return Err(GatewayError::FatalRemote { code, message });
                }
                RemoteStatus::Transient { message } => {
                    tracing::warn!("Transient remote error from {}: {}", url, message);
                }
            }
        }

        Err(GatewayError::AttemptsExhausted {
            attempts: self.policy.max_attempts,
        })
    }

    fn pacing_delay(&self, attempt: u32) -> Duration {
        let factor = self.policy.backoff_factor.powi(attempt as i32);
        Duration::from_secs_f64(self.policy.base_delay.as_secs_f64() * factor)
    }
}
