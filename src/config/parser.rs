use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

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
/// use site_mirror::config::load_config;
///
/// let config = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Root: {}", config.output.root.display());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is recorded in the manifest so runs made with different settings can
/// be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

/// Computes a SHA-256 hash of the effective settings
///
/// Used when no config file was given, or when command-line flags changed the
/// loaded configuration.
pub fn compute_settings_hash(config: &Config) -> String {
    hash_content(&format!("{:?}", config))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Parses a duration such as `90`, `30s`, `5m`, `1h` or `250ms`
///
/// A bare number is seconds.
///
/// ```
/// use site_mirror::config::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
/// assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let trimmed = input.trim();
    let invalid = || ConfigError::InvalidDuration(input.to_string());

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let duration = match unit.trim() {
        "" | "s" | "sec" | "secs" => Duration::from_secs(value),
        "ms" => Duration::from_millis(value),
        "m" | "min" | "mins" => Duration::from_secs(value.checked_mul(60).ok_or_else(invalid)?),
        "h" | "hr" | "hrs" => Duration::from_secs(value.checked_mul(3600).ok_or_else(invalid)?),
        _ => return Err(invalid()),
    };

    if duration.is_zero() {
        return Err(invalid());
    }

    Ok(duration)
}
