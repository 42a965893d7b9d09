//! Feed-platform client (OK-style REST API)
//!
//! Same fetch contract and pagination shape as the wall client, but a
//! different auth scheme (application key + access token) and a flat
//! `{error_code, error_msg}` error envelope instead of a nested one.
//! The feed API interleaves pinned and promoted entries, so here too the
//! loop scans all pages rather than stopping at the first too-old post.

use crate::harvest::{CancelFlag, DateWindow};
use crate::platform::gateway::{Gateway, GatewayError, RemoteStatus};
use crate::platform::{FetchError, Platform, PlatformClient, Post};
use crate::resolve::Target;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.ok.ru/";

/// Remote code meaning "flood blocked, slow down"
const RATE_LIMITED_CODE: i64 = 9;

/// Permission denied, session expired, invalid application key
const FATAL_CODES: [i64; 3] = [10, 102, 103];

/// Client for the group-feed REST API
pub struct FeedClient {
    gateway: Arc<Gateway>,
    base_url: Url,
    application_key: String,
    access_token: String,
    page_size: u32,
    max_posts: u32,
}

impl FeedClient {
    /// Creates a client pointed at the production feed API
    pub fn new(
        gateway: Arc<Gateway>,
        application_key: String,
        access_token: String,
        page_size: u32,
        max_posts: u32,
    ) -> Result<Self, GatewayError> {
        Self::with_base_url(
            gateway,
            application_key,
            access_token,
            page_size,
            max_posts,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock)
    pub fn with_base_url(
        gateway: Arc<Gateway>,
        application_key: String,
        access_token: String,
        page_size: u32,
        max_posts: u32,
        base_url: &str,
    ) -> Result<Self, GatewayError> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| GatewayError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            gateway,
            base_url,
            application_key,
            access_token,
            page_size,
            max_posts,
        })
    }

    /// Builds the `fb.do` dispatch URL for one API method
    fn method_url(&self, api_method: &str, extra: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = self
            .base_url
            .join("fb.do")
            .map_err(|e| GatewayError::InvalidBaseUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("method", api_method);
            pairs.append_pair("application_key", &self.application_key);
            pairs.append_pair("access_token", &self.access_token);
            pairs.append_pair("format", "json");
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Classifies the feed API's flat `{error_code, error_msg}` envelope
    fn classify(body: &Value) -> RemoteStatus {
        if let Some(code) = body.get("error_code").and_then(Value::as_i64) {
            let message = body
                .get("error_msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();

            if code == RATE_LIMITED_CODE {
                return RemoteStatus::RateLimited;
            }
            if FATAL_CODES.contains(&code) {
                return RemoteStatus::Fatal { code, message };
            }
            return RemoteStatus::Transient { message };
        }

        if body.get("posts").is_some() {
            RemoteStatus::Ok
        } else {
            RemoteStatus::Transient {
                message: "missing posts field".to_string(),
            }
        }
    }

    fn parse_post(item: &Value) -> Option<Post> {
        let id = item.get("id").and_then(Value::as_i64)?;
        let gid = item.get("gid").and_then(Value::as_i64)?;

        Some(Post {
            id,
            owner_id: gid.to_string(),
            text: item
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            timestamp: item.get("date").and_then(Value::as_i64).unwrap_or(0),
            views: item.get("views").and_then(Value::as_u64).unwrap_or(0),
            likes: item.get("likes").and_then(Value::as_u64).unwrap_or(0),
            reposts: item.get("reshares").and_then(Value::as_u64).unwrap_or(0),
            media_kind: item
                .get("media_type")
                .and_then(Value::as_str)
                .map(String::from),
            permalink: format!("https://ok.ru/group/{gid}/topic/{id}"),
        })
    }
}

#[async_trait]
impl PlatformClient for FeedClient {
    fn platform(&self) -> Platform {
        Platform::Ok
    }

    async fn fetch_posts(
        &self,
        target: &Target,
        window: &DateWindow,
        cancel: &CancelFlag,
    ) -> Result<Vec<Post>, FetchError> {
        let gid = target.bare_id();
        let mut posts = Vec::new();
        let mut offset: u32 = 0;

        while offset < self.max_posts && !cancel.is_cancelled() {
            let count = self.page_size.min(self.max_posts - offset);
            let url = self.method_url(
                "group.getStatuses",
                &[
                    ("gid", gid),
                    ("count", &count.to_string()),
                    ("offset", &offset.to_string()),
                ],
            )?;

            let body = match self.gateway.call(url, Self::classify).await {
                Ok(body) => body,
                Err(e @ GatewayError::FatalRemote { .. }) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Aborting pagination for {}: {}", target.platform_id, e);
                    break;
                }
            };

            let items = match body.get("posts").and_then(Value::as_array) {
                Some(items) => items,
                None => break,
            };
            if items.is_empty() {
                break;
            }

            let page_len = items.len();
            posts.extend(
                items
                    .iter()
                    .filter_map(Self::parse_post)
                    .filter(|post| window.contains(post.timestamp)),
            );

            offset += page_len as u32;
            if page_len < count as usize {
                break;
            }
        }

        Ok(posts)
    }
}
