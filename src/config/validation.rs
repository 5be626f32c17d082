use crate::config::types::{
    BlobConfig, Config, GeocoderConfig, OutputConfig, RegistryConfig, ScraperConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_registry_config(&config.registry)?;
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_geocoder_config(&config.geocoder)?;
    validate_blob_config(&config.blob)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_registry_config(config: &RegistryConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.scraper_name.is_empty() {
        return Err(ConfigError::Validation(
            "scraper-name cannot be empty".to_string(),
        ));
    }

    if !config
        .scraper_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "scraper-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.scraper_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_geocoder_config(config: &GeocoderConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid geocoder endpoint: {}", e)))?;

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "geocoder timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_blob_config(config: &BlobConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid blob endpoint: {}", e)))?;

    if config.bucket.is_empty() {
        return Err(ConfigError::Validation(
            "blob bucket cannot be empty".to_string(),
        ));
    }

    if let Some(base) = &config.public_base_url {
        Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid public-base-url: {}", e)))?;
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_validate_registry_rejects_bad_scheme() {
        let config = RegistryConfig {
            base_url: "ftp://subastas.example.es".to_string(),
        };
        assert!(validate_registry_config(&config).is_err());
    }

    #[test]
    fn test_validate_scraper_limits() {
        let mut config = ScraperConfig {
            search_delay_ms: 2000,
            detail_delay_ms: 1000,
            request_timeout_secs: 30,
            max_retries: 3,
        };
        assert!(validate_scraper_config(&config).is_ok());

        config.max_retries = 11;
        assert!(validate_scraper_config(&config).is_err());

        config.max_retries = 3;
        config.request_timeout_secs = 0;
        assert!(validate_scraper_config(&config).is_err());
    }
}
