use super::{types::Config, ConfigError};

/// Validates cross-field constraints the serde layer cannot express.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.playlist.url.trim().is_empty() {
        return Err(ConfigError::Invalid("playlist.url must not be empty".into()));
    }

    if config.stages.audio.extensions.is_empty() {
        return Err(ConfigError::Invalid(
            "stages.audio.extensions must list at least one extension".into(),
        ));
    }

    if config.stages.subtitle.language.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "stages.subtitle.language must not be empty".into(),
        ));
    }

    let density = config.stages.summary.min_density;
    if !(0.0..=1.0).contains(&density) {
        return Err(ConfigError::Invalid(format!(
            "stages.summary.min_density must be within 0.0..=1.0, got {density}"
        )));
    }

    if config.stages.summary.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "stages.summary.max_attempts must be at least 1".into(),
        ));
    }

    if config.docs.batch_size == 0 {
        return Err(ConfigError::Invalid(
            "docs.batch_size must be at least 1".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::loader::load_config_from_str;
    use super::*;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[playlist]
url = "https://www.youtube.com/playlist?list=abc"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_empty_playlist_url_rejected() {
        let mut config = base_config();
        config.playlist.url = "  ".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_density_out_of_range_rejected() {
        let mut config = base_config();
        config.stages.summary.min_density = 1.5;
        assert!(validate_config(&config).is_err());

        config.stages.summary.min_density = 1.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = base_config();
        config.docs.batch_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_no_audio_extensions_rejected() {
        let mut config = base_config();
        config.stages.audio.extensions.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_retry_budget_rejected() {
        let mut config = base_config();
        config.stages.summary.max_attempts = 0;
        assert!(validate_config(&config).is_err());
    }
}
