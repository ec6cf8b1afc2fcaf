//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{HeraldConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_timings(config)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_timings(config: &HeraldConfig) -> ConfigResult<()> {
    if config.readiness.timeout_ms == 0 {
        return Err(ConfigError::validation(
            "Readiness timeout must be greater than 0",
        ));
    }

    if config.notifier.retry_delay_ms == 0 {
        return Err(ConfigError::validation(
            "Notifier retry delay must be greater than 0",
        ));
    }

    if config.bootstrap.user_dir.as_os_str().is_empty() {
        return Err(ConfigError::validation("Bootstrap user_dir cannot be empty"));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "Logging output is 'file' but no file_path is set",
        ));
    }

    // Keys become EnvFilter directives.
    for module in logging.filters.keys() {
        if module.is_empty() || module.contains(char::is_whitespace) || module.contains('=') {
            return Err(ConfigError::validation(format!(
                "Invalid logging filter target: '{module}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&HeraldConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_timings() {
        let mut config = HeraldConfig::default();
        config.readiness.timeout_ms = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        let mut config = HeraldConfig::default();
        config.notifier.retry_delay_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = HeraldConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some(PathBuf::from("logs/herald.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_filter_targets() {
        let mut config = HeraldConfig::default();
        config
            .logging
            .filters
            .insert("herald_framework".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_ok());

        config.logging.filters.insert("bad target".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
