use crate::SeineError;

/// API credentials read from the process environment
///
/// Credentials never live in the config file. Each accessor fails only when
/// the credential its platform needs is actually missing, so a run that
/// touches a single platform needs only that platform's variables set.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    wall_token: Option<String>,
    feed_access_token: Option<String>,
    feed_application_key: Option<String>,
    stream_api_id: Option<String>,
    stream_api_hash: Option<String>,
    stream_phone: Option<String>,
}

impl Secrets {
    /// Reads all known credential variables from the environment
    pub fn from_env() -> Self {
        Self {
            wall_token: std::env::var("VK_TOKEN").ok(),
            feed_access_token: std::env::var("OK_ACCESS_TOKEN").ok(),
            feed_application_key: std::env::var("OK_APPLICATION_KEY").ok(),
            stream_api_id: std::env::var("TG_API_ID").ok(),
            stream_api_hash: std::env::var("TG_API_HASH").ok(),
            stream_phone: std::env::var("TG_PHONE").ok(),
        }
    }

    pub fn wall_token(&self) -> Result<&str, SeineError> {
        self.wall_token
            .as_deref()
            .ok_or(SeineError::MissingCredential("VK_TOKEN"))
    }

    pub fn feed_access_token(&self) -> Result<&str, SeineError> {
        self.feed_access_token
            .as_deref()
            .ok_or(SeineError::MissingCredential("OK_ACCESS_TOKEN"))
    }

    pub fn feed_application_key(&self) -> Result<&str, SeineError> {
        self.feed_application_key
            .as_deref()
            .ok_or(SeineError::MissingCredential("OK_APPLICATION_KEY"))
    }

    pub fn stream_api_id(&self) -> Result<&str, SeineError> {
        self.stream_api_id
            .as_deref()
            .ok_or(SeineError::MissingCredential("TG_API_ID"))
    }

    pub fn stream_api_hash(&self) -> Result<&str, SeineError> {
        self.stream_api_hash
            .as_deref()
            .ok_or(SeineError::MissingCredential("TG_API_HASH"))
    }

    pub fn stream_phone(&self) -> Result<&str, SeineError> {
        self.stream_phone
            .as_deref()
            .ok_or(SeineError::MissingCredential("TG_PHONE"))
    }
}
