//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::EngineConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "config validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: EngineConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    struct TempConfig {
        path: PathBuf,
    }

    impl TempConfig {
        fn write(name: &str, content: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "security-gate-{}-{}.toml",
                name,
                std::process::id()
            ));
            fs::write(&path, content).unwrap();
            Self { path }
        }
    }

    impl Drop for TempConfig {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    #[test]
    fn loads_valid_file() {
        let file = TempConfig::write(
            "valid",
            r#"
            [rate_limiter]
            max_requests = 3
            time_window_secs = 5
            "#,
        );

        let config = load_config(&file.path).unwrap();
        assert_eq!(config.rate_limiter.max_requests, 3);
    }

    #[test]
    fn reports_parse_errors() {
        let file = TempConfig::write("broken", "this is not toml [");
        assert!(matches!(load_config(&file.path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn reports_validation_errors() {
        let file = TempConfig::write(
            "invalid",
            r#"
            [rate_limiter]
            max_requests = 0
            "#,
        );
        assert!(matches!(
            load_config(&file.path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("security-gate-does-not-exist.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
