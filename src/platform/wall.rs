//! Wall-platform client (VK-style REST API)
//!
//! Fetches community wall posts through the shared [`Gateway`], paging with
//! an offset and filtering client-side by the date window. The wall API does
//! not guarantee strictly reverse-chronological order across page boundaries
//! (pinned posts break it), so the loop scans through out-of-window pages
//! instead of stopping at the first too-old post.

use crate::harvest::{CancelFlag, DateWindow};
use crate::platform::gateway::{Gateway, GatewayError, RemoteStatus};
use crate::platform::{FetchError, Platform, PlatformClient, Post};
use crate::resolve::Target;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.vk.com/";

/// Remote code meaning "too many requests per second"
const RATE_LIMITED_CODE: i64 = 6;

/// Auth failure, access denied, page removed, invalid request
const FATAL_CODES: [i64; 4] = [5, 15, 18, 100];

/// Client for the wall-style REST API
pub struct WallClient {
    gateway: Arc<Gateway>,
    base_url: Url,
    token: String,
    api_version: String,
    page_size: u32,
    max_posts: u32,
}

impl WallClient {
    /// Creates a client pointed at the production wall API
    pub fn new(
        gateway: Arc<Gateway>,
        token: String,
        api_version: String,
        page_size: u32,
        max_posts: u32,
    ) -> Result<Self, GatewayError> {
        Self::with_base_url(gateway, token, api_version, page_size, max_posts, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock)
    pub fn with_base_url(
        gateway: Arc<Gateway>,
        token: String,
        api_version: String,
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
            token,
            api_version,
            page_size,
            max_posts,
        })
    }

    /// Builds a method URL with percent-encoded query parameters
    fn method_url(&self, method: &str, extra: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = self
            .base_url
            .join(&format!("method/{method}"))
            .map_err(|e| GatewayError::InvalidBaseUrl(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("access_token", &self.token);
            pairs.append_pair("v", &self.api_version);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Classifies the wall API's `{error: {error_code, error_msg}}` envelope
    fn classify(body: &Value) -> RemoteStatus {
        if let Some(error) = body.get("error") {
            let code = error
                .get("error_code")
                .and_then(Value::as_i64)
                .unwrap_or(-1);
            let message = error
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

        if body.get("response").is_some() {
            RemoteStatus::Ok
        } else {
            RemoteStatus::Transient {
                message: "missing response envelope".to_string(),
            }
        }
    }

    fn parse_post(item: &Value) -> Option<Post> {
        let id = item.get("id").and_then(Value::as_i64)?;
        let owner_id = item.get("owner_id").and_then(Value::as_i64)?;

        Some(Post {
            id,
            owner_id: owner_id.to_string(),
            text: item
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            timestamp: item.get("date").and_then(Value::as_i64).unwrap_or(0),
            views: item
                .pointer("/views/count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            likes: item
                .pointer("/likes/count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            reposts: item
                .pointer("/reposts/count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            media_kind: item
                .pointer("/attachments/0/type")
                .and_then(Value::as_str)
                .map(String::from),
            permalink: format!("https://vk.com/wall{owner_id}_{id}"),
        })
    }
}

#[async_trait]
impl PlatformClient for WallClient {
    fn platform(&self) -> Platform {
        Platform::Vk
    }

    async fn fetch_posts(
        &self,
        target: &Target,
        window: &DateWindow,
        cancel: &CancelFlag,
    ) -> Result<Vec<Post>, FetchError> {
        let domain = target.bare_id();
        let mut posts = Vec::new();
        let mut offset: u32 = 0;

        while offset < self.max_posts && !cancel.is_cancelled() {
            let count = self.page_size.min(self.max_posts - offset);
            let url = self.method_url(
                "wall.get",
                &[
                    ("domain", domain),
                    ("count", &count.to_string()),
                    ("offset", &offset.to_string()),
                    ("filter", "owner"),
                ],
            )?;

            let body = match self.gateway.call(url, Self::classify).await {
                Ok(body) => body,
                Err(e @ GatewayError::FatalRemote { .. }) => return Err(e.into()),
                Err(e) => {
                    // Partial results are kept; only this target's remaining
                    // pagination is abandoned.
                    tracing::warn!("Aborting pagination for {}: {}", target.platform_id, e);
                    break;
                }
            };

            let items = match body.pointer("/response/items").and_then(Value::as_array) {
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
