use serde::Deserialize;

/// Main configuration structure for Seine
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub platforms: PlatformsConfig,
}

/// Harvest behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Maximum number of targets processed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum number of posts fetched per target
    #[serde(rename = "max-posts-per-target", default = "default_max_posts")]
    pub max_posts_per_target: u32,

    /// Page size for paginated API calls
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Base pacing delay before each API attempt (milliseconds)
    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Multiplier applied to the delay on each retry
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Attempts per API call before giving up
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_posts_per_target: default_max_posts(),
            page_size: default_page_size(),
            base_delay_ms: default_base_delay_ms(),
            backoff_factor: default_backoff_factor(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory where the report and run state are written
    #[serde(rename = "save-dir")]
    pub save_dir: String,
}

/// Platform endpoint configuration
///
/// The defaults point at the production endpoints; tests override them with
/// local mock servers.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformsConfig {
    /// Wall API version sent with every request
    #[serde(rename = "wall-api-version", default = "default_wall_api_version")]
    pub wall_api_version: String,

    #[serde(rename = "wall-base-url", default = "default_wall_base_url")]
    pub wall_base_url: String,

    #[serde(rename = "feed-base-url", default = "default_feed_base_url")]
    pub feed_base_url: String,

    #[serde(rename = "stream-base-url", default = "default_stream_base_url")]
    pub stream_base_url: String,
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            wall_api_version: default_wall_api_version(),
            wall_base_url: default_wall_base_url(),
            feed_base_url: default_feed_base_url(),
            stream_base_url: default_stream_base_url(),
        }
    }
}

fn default_concurrency() -> usize {
    crate::harvest::DEFAULT_CONCURRENCY
}

fn default_max_posts() -> u32 {
    100
}

fn default_page_size() -> u32 {
    100
}

fn default_base_delay_ms() -> u64 {
    340
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_max_attempts() -> u32 {
    3
}

fn default_wall_api_version() -> String {
    "5.137".to_string()
}

fn default_wall_base_url() -> String {
    "https://api.vk.com/".to_string()
}

fn default_feed_base_url() -> String {
    "https://api.ok.ru/".to_string()
}

fn default_stream_base_url() -> String {
    "https://api.telegram.org/".to_string()
}
