use std::path::PathBuf;

use config::{Config, Environment};
use serde::Deserialize;

use crate::errors::{to_env_var, ConfigError};

/// Application settings layered from defaults and `QUILL_*` environment variables.
/// Provider credentials are read separately by each provider config.
#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_save")]
    pub save: bool,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("output_dir", default_output_dir().to_string_lossy().to_string())?
            .set_default("save", default_save())?
            .add_source(
                Environment::with_prefix("QUILL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("rez")
}

fn default_save() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("QUILL_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("rez"));
        assert!(settings.save);
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("QUILL_OUTPUT_DIR", "/tmp/reports");
        env::set_var("QUILL_SAVE", "false");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/reports"));
        assert!(!settings.save);

        env::remove_var("QUILL_OUTPUT_DIR");
        env::remove_var("QUILL_SAVE");
    }

    #[test]
    #[serial]
    fn test_invalid_value() {
        clean_env();
        env::set_var("QUILL_SAVE", "sometimes");

        let result = Settings::new();
        assert!(matches!(result, Err(ConfigError::Other(_))));

        env::remove_var("QUILL_SAVE");
    }
}
