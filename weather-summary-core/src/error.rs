use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to send request to OpenWeather ({endpoint}): {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse OpenWeather {endpoint} JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that stops a report from being produced. There is no partial report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Malformed weather payload: {0}")]
    MalformedPayload(String),

    #[error("Timestamp {0} cannot be represented as a local time")]
    InvalidTimestamp(i64),

    #[error("Invalid coordinates ({latitude}, {longitude}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

impl ReportError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ReportError::MalformedPayload(msg.into())
    }
}
