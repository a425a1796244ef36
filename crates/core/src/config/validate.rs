use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one conversion may run at a time
/// - Download timeout is at least one second
/// - MIDI output templates are present and reference `{stem}`
/// - Link path prefix is empty or absolute
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.dispatcher.max_parallel_conversions == 0 {
        return Err(ConfigError::ValidationError(
            "dispatcher.max_parallel_conversions must be at least 1".to_string(),
        ));
    }

    if config.dispatcher.conversion_timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "dispatcher.conversion_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.download.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "download.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.engines.midi_output_templates.is_empty() {
        return Err(ConfigError::ValidationError(
            "engines.midi_output_templates cannot be empty".to_string(),
        ));
    }

    if let Some(template) = config
        .engines
        .midi_output_templates
        .iter()
        .find(|t| !t.contains("{stem}"))
    {
        return Err(ConfigError::ValidationError(format!(
            "engines.midi_output_templates entry '{}' must contain {{stem}}",
            template
        )));
    }

    let prefix = &config.links.path_prefix;
    if !prefix.is_empty() && !prefix.starts_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "links.path_prefix '{}' must start with '/'",
            prefix
        )));
    }

    Ok(())
}
