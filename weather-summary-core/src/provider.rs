use crate::{
    Config, Coordinates, ProviderError, RawWeatherPayload,
    provider::openweather::OpenWeatherProvider,
};
use anyhow::Context;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of raw weather payloads for a location.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions plus the hourly and daily forecast.
    async fn fetch_current_and_forecast(
        &self,
        location: Coordinates,
    ) -> Result<RawWeatherPayload, ProviderError>;

    /// Observed conditions for the day containing `timestamp` (epoch seconds).
    async fn fetch_historical(
        &self,
        location: Coordinates,
        timestamp: i64,
    ) -> Result<RawWeatherPayload, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weather-summary configure`, pass --api-key or set OPENWEATHER_API_KEY."
        )
    })?;

    let http = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let provider = OpenWeatherProvider::with_base_url(api_key.to_owned(), config.base_url())
        .with_client(http);

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `weather-summary configure`"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
