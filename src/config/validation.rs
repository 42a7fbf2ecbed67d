use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use encoding_rs::Encoding;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    config.deadline()?;

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout must be >= 1 second, got {}",
            config.request_timeout
        )));
    }

    if Encoding::for_label(config.fallback_charset.trim().as_bytes()).is_none() {
        return Err(ConfigError::Validation(format!(
            "fallback-charset '{}' is not a known charset",
            config.fallback_charset
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation("root cannot be empty".to_string()));
    }

    if config.root.exists() && !config.root.is_dir() {
        return Err(ConfigError::RootNotDirectory(config.root.clone()));
    }

    if let Some(manifest) = &config.manifest_path {
        if manifest.is_dir() {
            return Err(ConfigError::Validation(format!(
                "manifest-path points to a directory: {}",
                manifest.display()
            )));
        }
    }

    Ok(())
}
