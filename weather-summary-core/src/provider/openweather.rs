use std::fmt;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::{Coordinates, ProviderError, RawWeatherPayload};

use super::WeatherProvider;

/// One Call endpoint; the historical variant lives under `/timemachine`.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";

const FORECAST_ENDPOINT: &str = "current/forecast";
const HISTORY_ENDPOINT: &str = "timemachine";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

// The API key stays out of logs and error output.
impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http: Client::new() }
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn forecast_url(&self) -> String {
        self.base_url.clone()
    }

    fn history_url(&self) -> String {
        format!("{}/{HISTORY_ENDPOINT}", self.base_url)
    }

    /// Query parameters without the API key. Temperatures come back in °F.
    fn query(location: Coordinates, timestamp: Option<i64>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
        ];
        if let Some(ts) = timestamp {
            params.push(("dt", ts.to_string()));
        }
        params.push(("units", "imperial".to_string()));
        params.push(("exclude", "minutely".to_string()));
        params
    }

    async fn get_payload(
        &self,
        endpoint: &'static str,
        url: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<RawWeatherPayload, ProviderError> {
        debug!("GET {url} {params:?}");
        params.push(("appid", self.api_key.clone()));

        let res = self
            .http
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|source| ProviderError::Transport { endpoint, source: source.without_url() })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ProviderError::Transport { endpoint, source: source.without_url() })?;

        if !status.is_success() {
            return Err(ProviderError::Status { endpoint, status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(|source| ProviderError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current_and_forecast(
        &self,
        location: Coordinates,
    ) -> Result<RawWeatherPayload, ProviderError> {
        self.get_payload(FORECAST_ENDPOINT, &self.forecast_url(), Self::query(location, None)).await
    }

    async fn fetch_historical(
        &self,
        location: Coordinates,
        timestamp: i64,
    ) -> Result<RawWeatherPayload, ProviderError> {
        let params = Self::query(location, Some(timestamp));
        self.get_payload(HISTORY_ENDPOINT, &self.history_url(), params).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
