use crate::config::types::{Config, HarvestConfig, OutputConfig, PlatformsConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_output_config(&config.output)?;
    validate_platforms_config(&config.platforms)?;
    Ok(())
}

/// Validates harvest configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.max_posts_per_target < 1 {
        return Err(ConfigError::Validation(
            "max_posts_per_target must be >= 1".to_string(),
        ));
    }

    if config.page_size < 1 || config.page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    if config.backoff_factor < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be >= 1.0, got {}",
            config.backoff_factor
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max_attempts must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.save_dir.is_empty() {
        return Err(ConfigError::Validation(
            "save_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates platform endpoint configuration
fn validate_platforms_config(config: &PlatformsConfig) -> Result<(), ConfigError> {
    if config.wall_api_version.is_empty() {
        return Err(ConfigError::Validation(
            "wall_api_version cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("wall_base_url", &config.wall_base_url),
        ("feed_base_url", &config.feed_base_url),
        ("stream_base_url", &config.stream_base_url),
    ] {
        Url::parse(value).map_err(|e| {
            ConfigError::Validation(format!("Invalid {name} '{value}': {e}"))
        })?;
    }

    Ok(())
}
