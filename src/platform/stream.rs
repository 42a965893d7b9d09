//! Message-stream platform client (Telegram-like message-iteration API)
//!
//! Unlike the REST clients this platform works over a persistent
//! authenticated session. The transport is a trait so tests can drive the
//! auth state machine and history iteration without a network; the shipped
//! [`HttpStreamTransport`] talks to the platform's HTTP surface and keeps the
//! session token it receives on sign-in.
//!
//! History is iterated newest-first and the platform guarantees strict
//! reverse-chronological order within a channel, so fetching stops at the
//! first message older than the window start. A flood-wait from the platform
//! is honored as a mandatory sleep, never treated as fatal.

use crate::harvest::{CancelFlag, DateWindow};
use crate::platform::auth::{AuthError, StreamSession};
use crate::platform::{FetchError, Platform, PlatformClient, Post};
use crate::resolve::Target;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

/// One message from a channel's history
#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub id: i64,
    /// Publication time, unix seconds
    pub date: i64,
    pub text: String,
    pub views: u64,
    pub forwards: u64,
    pub media_kind: Option<String>,
}

/// Result of submitting a one-time login code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignIn {
    /// The session is fully authorized
    Authorized,
    /// The account has a two-factor password that must be submitted next
    PasswordNeeded,
}

/// Transport-level failures of the message-stream session
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Invalid login code")]
    InvalidCode,

    #[error("Invalid two-factor password")]
    InvalidPassword,

    #[error("Flood wait: platform requires a {0}s pause")]
    FloodWait(u64),

    #[error("Session is not authorized")]
    Unauthorized,

    #[error("Transport failure: {0}")]
    Network(String),
}

/// Wire-level operations of the message-stream platform
///
/// Methods take `&mut self` because the transport owns mutable session
/// state (the token handed out on sign-in).
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Requests a one-time login code for the given phone number
    async fn send_login_code(&mut self, phone: &str) -> Result<(), TransportError>;

    /// Submits the one-time code received out of band
    async fn sign_in(&mut self, phone: &str, code: &str) -> Result<SignIn, TransportError>;

    /// Submits the secondary password when two-factor auth is enabled
    async fn check_password(&mut self, password: &str) -> Result<(), TransportError>;

    /// Fetches one page of channel history, newest-first
    ///
    /// `offset_id = 0` starts from the newest message; otherwise the page
    /// starts strictly below the given message id.
    async fn history_page(
        &mut self,
        channel: &str,
        offset_id: i64,
        limit: u32,
    ) -> Result<Vec<StreamMessage>, TransportError>;
}

/// HTTP-backed transport for the message-stream platform
pub struct HttpStreamTransport {
    client: reqwest::Client,
    base_url: Url,
    api_id: String,
    api_hash: String,
    session_token: Option<String>,
}

impl HttpStreamTransport {
    /// Creates a transport for the given API surface
    ///
    /// `api_id` and `api_hash` identify the application; the session token
    /// is acquired during sign-in and kept for the transport's lifetime.
    pub fn new(base_url: &str, api_id: String, api_hash: String) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| TransportError::Network(format!("invalid base URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_id,
            api_hash,
            session_token: None,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::Network(e.to_string()))
    }

    /// Maps the platform's error strings onto [`TransportError`]
    fn classify_error(body: &Value) -> Option<TransportError> {
        let error = body.get("error").and_then(Value::as_str)?;
        Some(match error {
            "PHONE_NUMBER_INVALID" => TransportError::InvalidPhone,
            "PHONE_CODE_INVALID" => TransportError::InvalidCode,
            "PASSWORD_HASH_INVALID" => TransportError::InvalidPassword,
            "AUTH_KEY_UNREGISTERED" => TransportError::Unauthorized,
            "FLOOD_WAIT" => {
                let seconds = body.get("seconds").and_then(Value::as_u64).unwrap_or(30);
                TransportError::FloodWait(seconds)
            }
            other => TransportError::Network(other.to_string()),
        })
    }

    async fn post_json(&self, path: &str, payload: Value) -> Result<Value, TransportError> {
        let url = self.endpoint(path)?;
        let mut request = self.client.post(url).json(&payload);
        if let Some(token) = &self.session_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if let Some(err) = Self::classify_error(&body) {
            return Err(err);
        }
        Ok(body)
    }

    fn parse_message(item: &Value) -> Option<StreamMessage> {
        Some(StreamMessage {
            id: item.get("id").and_then(Value::as_i64)?,
            date: item.get("date").and_then(Value::as_i64).unwrap_or(0),
            text: item
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            views: item.get("views").and_then(Value::as_u64).unwrap_or(0),
            forwards: item.get("forwards").and_then(Value::as_u64).unwrap_or(0),
            media_kind: item
                .get("media")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }
}

#[async_trait]
impl StreamTransport for HttpStreamTransport {
    async fn send_login_code(&mut self, phone: &str) -> Result<(), TransportError> {
        self.post_json(
            "auth/sendCode",
            serde_json::json!({
                "api_id": self.api_id,
                "api_hash": self.api_hash,
                "phone": phone,
            }),
        )
        .await?;
        Ok(())
    }

    async fn sign_in(&mut self, phone: &str, code: &str) -> Result<SignIn, TransportError> {
        let body = self
            .post_json(
                "auth/signIn",
                serde_json::json!({"phone": phone, "code": code}),
            )
            .await?;

        match body.get("status").and_then(Value::as_str) {
            Some("password_needed") => Ok(SignIn::PasswordNeeded),
            Some("authorized") => {
                self.session_token = body
                    .get("session")
                    .and_then(Value::as_str)
                    .map(String::from);
                Ok(SignIn::Authorized)
            }
            other => Err(TransportError::Network(format!(
                "unexpected sign-in status: {other:?}"
            ))),
        }
    }

    async fn check_password(&mut self, password: &str) -> Result<(), TransportError> {
        let body = self
            .post_json("auth/checkPassword", serde_json::json!({"password": password}))
            .await?;

        self.session_token = body
            .get("session")
            .and_then(Value::as_str)
            .map(String::from);
        Ok(())
    }

    async fn history_page(
        &mut self,
        channel: &str,
        offset_id: i64,
        limit: u32,
    ) -> Result<Vec<StreamMessage>, TransportError> {
        if self.session_token.is_none() {
            return Err(TransportError::Unauthorized);
        }

        let body = self
            .post_json(
                "messages/history",
                serde_json::json!({
                    "channel": channel,
                    "offset_id": offset_id,
                    "limit": limit,
                }),
            )
            .await?;

        let messages = body
            .get("messages")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::parse_message).collect())
            .unwrap_or_default();
        Ok(messages)
    }
}

/// Client for the message-stream platform
///
/// Holds the process-wide session behind a mutex: the session is shared by
/// all stream targets in a run but never used by two fetches concurrently.
pub struct StreamClient {
    session: Arc<Mutex<StreamSession>>,
    page_size: u32,
}

impl StreamClient {
    pub fn new(session: Arc<Mutex<StreamSession>>, page_size: u32) -> Self {
        Self { session, page_size }
    }

    fn to_post(channel: &str, msg: &StreamMessage) -> Post {
        Post {
            id: msg.id,
            owner_id: channel.to_string(),
            text: msg.text.clone(),
            timestamp: msg.date,
            views: msg.views,
            likes: 0,
            reposts: msg.forwards,
            media_kind: msg.media_kind.clone(),
            permalink: format!("https://t.me/{channel}/{}", msg.id),
        }
    }
}

#[async_trait]
impl PlatformClient for StreamClient {
    fn platform(&self) -> Platform {
        Platform::Tg
    }

    async fn fetch_posts(
        &self,
        target: &Target,
        window: &DateWindow,
        cancel: &CancelFlag,
    ) -> Result<Vec<Post>, FetchError> {
        let mut session = self.session.lock().await;
        if !session.is_authenticated() {
            return Err(AuthError::AuthenticationRequired.into());
        }

        let channel = target.bare_id();
        let mut posts = Vec::new();
        let mut offset_id: i64 = 0;

        'history: loop {
            if cancel.is_cancelled() {
                break;
            }

            let batch = match session.history_page(channel, offset_id, self.page_size).await {
                Ok(batch) => batch,
                Err(TransportError::FloodWait(seconds)) => {
                    tracing::warn!(
                        "Flood wait on channel {}: sleeping {}s before continuing",
                        channel,
                        seconds
                    );
                    tokio::time::sleep(Duration::from_secs(seconds)).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let Some(last) = batch.last() else {
                break;
            };
            offset_id = last.id;

            for msg in &batch {
                // Strict reverse-chronological order within a channel: the
                // first too-old message ends the iteration.
                if msg.date < window.start_ts() {
                    break 'history;
                }
                if msg.date < window.end_ts() {
                    posts.push(Self::to_post(channel, msg));
                }
            }
        }

        Ok(posts)
    }
}
