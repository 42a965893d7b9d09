use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use seine::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Concurrency: {}", config.harvest.concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[harvest]
concurrency = 3
max-posts-per-target = 50
page-size = 25
base-delay-ms = 100
backoff-factor = 1.5
max-attempts = 2

[output]
save-dir = "./out"

[platforms]
wall-api-version = "5.137"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.harvest.concurrency, 3);
        assert_eq!(config.harvest.max_posts_per_target, 50);
        assert_eq!(config.harvest.page_size, 25);
        assert_eq!(config.output.save_dir, "./out");
        assert_eq!(config.platforms.wall_api_version, "5.137");
    }

    #[test]
    fn test_omitted_sections_fall_back_to_defaults() {
        let config_content = r#"
[output]
save-dir = "./out"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.harvest.concurrency, 5);
        assert_eq!(config.harvest.max_posts_per_target, 100);
        assert_eq!(config.harvest.base_delay_ms, 340);
        assert_eq!(config.harvest.max_attempts, 3);
        assert_eq!(config.platforms.wall_base_url, "https://api.vk.com/");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[harvest]
page-size = 0

[output]
save-dir = "./out"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
