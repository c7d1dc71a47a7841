//! Core library for the `weather-summary` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather One Call client behind a provider abstraction
//! - Normalization of raw provider JSON into flat weather records
//! - Rendering of those records into the daily text summary
//!
//! It is used by `weather-summary-cli`, but can also be reused by other binaries.

pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod report;
pub mod time;
pub mod units;
pub mod wind;

pub use config::{Config, ProviderConfig};
pub use error::{ProviderError, ReportError};
pub use model::{Coordinates, FieldValue, NormalizedResultSet, RawWeatherPayload, WeatherRecord};
pub use provider::{WeatherProvider, provider_from_config};
pub use report::{create_weather_summary, create_weather_summary_at};
