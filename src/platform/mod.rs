//! Platform clients and the shared request gateway
//!
//! Each supported platform exposes the same capability: fetch the posts of
//! one community inside a date window. The wall and feed platforms are
//! discrete REST APIs and share the rate-limited [`Gateway`]; the message
//! stream is a persistent authenticated session with its own flood-control
//! convention.

pub mod auth;
pub mod feed;
pub mod gateway;
pub mod stream;
pub mod wall;

use crate::harvest::{CancelFlag, DateWindow};
use crate::resolve::Target;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use auth::{AuthError, AuthState, StreamSession};
pub use feed::FeedClient;
pub use gateway::{Gateway, GatewayError, RemoteStatus, RetryPolicy};
pub use stream::{
    HttpStreamTransport, SignIn, StreamClient, StreamMessage, StreamTransport, TransportError,
};
pub use wall::WallClient;

/// The platforms a target link can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Wall-style REST API (VK-like)
    Vk,
    /// Group-feed REST API (OK-like)
    Ok,
    /// Persistent message-stream session (Telegram-like)
    Tg,
}

impl Platform {
    /// Prefix used to tag canonical platform identifiers
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Platform::Vk => "vk_",
            Platform::Ok => "ok_",
            Platform::Tg => "tg_",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Vk => write!(f, "vk"),
            Platform::Ok => write!(f, "ok"),
            Platform::Tg => write!(f, "tg"),
        }
    }
}

/// One post fetched from a platform for one date window
///
/// Transient: produced by a platform client, consumed by the keyword
/// matcher, then discarded.
#[derive(Debug, Clone)]
pub struct Post {
    /// Platform-local post identifier
    pub id: i64,

    /// Platform-specific owner identifier (numeric id or screen name)
    pub owner_id: String,

    /// Post body text
    pub text: String,

    /// Publication time, unix seconds
    pub timestamp: i64,

    pub views: u64,
    pub likes: u64,
    pub reposts: u64,

    /// Kind of the first attached media, when any
    pub media_kind: Option<String>,

    /// Stable link to the post
    pub permalink: String,
}

/// Errors a platform client can surface for one target
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Message stream failure: {0}")]
    Stream(#[from] TransportError),
}

/// Capability shared by all platform clients
///
/// `fetch_posts` returns a finite, ordered sequence of posts for one target
/// and one window; the iteration is not restartable across calls. Clients
/// check the cancel flag at page boundaries and keep partial results on
/// non-fatal per-page errors.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// The platform this client serves
    fn platform(&self) -> Platform;

    /// Fetches the posts of `target` that fall inside `window`
    async fn fetch_posts(
        &self,
        target: &Target,
        window: &DateWindow,
        cancel: &CancelFlag,
    ) -> Result<Vec<Post>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_prefixes_are_distinct() {
        assert_eq!(Platform::Vk.id_prefix(), "vk_");
        assert_eq!(Platform::Ok.id_prefix(), "ok_");
        assert_eq!(Platform::Tg.id_prefix(), "tg_");
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::Vk.to_string(), "vk");
        assert_eq!(Platform::Ok.to_string(), "ok");
        assert_eq!(Platform::Tg.to_string(), "tg");
    }
}
