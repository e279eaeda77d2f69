use crate::{
    Config, WidgetError,
    model::{CurrentConditions, ForecastSample, Location},
    provider::openweather::OpenWeatherService,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The three remote lookups the pipeline chains together.
///
/// Implementations return fully validated data; fallbacks for optional
/// fields are applied before anything leaves the service.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    /// Resolve a city name to its first candidate location.
    async fn geocode(&self, city: &str) -> Result<Location, WidgetError>;

    async fn current(&self, location: &Location) -> Result<CurrentConditions, WidgetError>;

    /// The raw series, chronological; noon selection happens later.
    async fn forecast(&self, location: &Location) -> Result<Vec<ForecastSample>, WidgetError>;
}

/// Construct the OpenWeather service from config.
pub fn service_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherService>> {
    let api_key = config.api_key()?;
    Ok(Box::new(OpenWeatherService::new(api_key.to_owned(), config.endpoints.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = service_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn service_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(service_from_config(&cfg).is_ok());
    }
}
