use mediaconv_core::config::LinkConfig;
use mediaconv_core::{Config, ConversionError, ConversionService};

/// Shared application state
pub struct AppState {
    config: Config,
    service: ConversionService,
}

impl AppState {
    pub fn new(config: Config, service: ConversionService) -> Self {
        Self { config, service }
    }

    /// Builds the state with the engines named in `config`.
    pub fn from_config(config: Config) -> Result<Self, ConversionError> {
        let service = ConversionService::from_config(&config)?;
        Ok(Self::new(config, service))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn links(&self) -> &LinkConfig {
        &self.config.links
    }

    pub fn service(&self) -> &ConversionService {
        &self.service
    }
}
