//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the credential secret.
pub const ENV_CREDENTIAL_VALUE: &str = "GATE_CREDENTIAL_VALUE";
/// Overrides the audit database URL.
pub const ENV_DATABASE_URL: &str = "GATE_DATABASE_URL";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GateConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Apply environment overrides to `config` and validate the result.
pub fn finalize(mut config: GateConfig) -> Result<GateConfig, ConfigError> {
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_overrides(config: &mut GateConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(value) = lookup(ENV_CREDENTIAL_VALUE) {
        config.credential.value = value;
    }
    if let Some(url) = lookup(ENV_DATABASE_URL) {
        config.audit.database_url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [rate_limit]
            max_requests = 5

            [audit]
            backend = "memory"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.rate_limit.max_requests, 5);
    }

    #[test]
    fn test_invalid_config_reports_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rate_limit]\nmax_requests = 0\nwindow_secs = 0").unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GateConfig::default();
        apply_overrides(&mut config, |key| match key {
            ENV_CREDENTIAL_VALUE => Some("from-env".to_string()),
            _ => None,
        });
        assert_eq!(config.credential.value, "from-env");
        assert_eq!(config.audit.database_url, "sqlite://audit.db");
    }
}
