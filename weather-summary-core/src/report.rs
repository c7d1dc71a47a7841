//! Assembly of the daily summary from the two provider payloads.

use std::fmt::Display;

use chrono::{Local, NaiveDate, TimeZone};
use log::{debug, info};

use crate::{
    error::ReportError,
    format::conditions_summary,
    geo::distance_meters,
    model::{Coordinates, FieldValue, NormalizedResultSet},
    normalize::normalize_in,
    provider::WeatherProvider,
    time::{hour_stamp, local_midnight},
    units::meters_to_miles,
};

/// Local hours sampled from the day's observed conditions, in report order.
pub const REPORT_HOURS: [u32; 4] = [7, 10, 13, 16];

/// Render the report for `today`.
///
/// `forecast` comes from the current/forecast call and `actuals` from the
/// historical call; station coordinates are taken from `forecast`. An hour in
/// [`REPORT_HOURS`] without an observed record is left out.
pub fn summary_weather_report(
    forecast: &NormalizedResultSet,
    actuals: &NormalizedResultSet,
    reporting_location: Coordinates,
    today: NaiveDate,
) -> Result<String, ReportError> {
    let current = forecast
        .current
        .as_ref()
        .ok_or_else(|| ReportError::malformed("no `current` conditions in forecast payload"))?;
    let mut daily = forecast
        .daily
        .first()
        .cloned()
        .ok_or_else(|| ReportError::malformed("no `daily` forecast in forecast payload"))?;
    daily.remove("sunrise");
    daily.remove("sunset");

    let current_dt = current.require("dt")?;

    let mut summary = String::new();
    summary.push_str(&format!(
        "Current Conditions {current_dt}\n{}\n",
        conditions_summary(current)?
    ));
    summary.push_str(&format!("Forecast {current_dt}\n{}\n", conditions_summary(&daily)?));

    for hour in REPORT_HOURS {
        let stamp = hour_stamp(today, hour)?;
        let observed = actuals
            .hourly
            .iter()
            .find(|record| matches!(record.field("dt"), FieldValue::Text(dt) if *dt == stamp));

        match observed {
            Some(record) => {
                summary.push_str(&format!("Conditions at {stamp}\n{}\n", conditions_summary(record)?));
            }
            None => debug!("no observed conditions for {stamp}, skipping"),
        }
    }

    let station = forecast.raw.station_location()?;
    let miles = meters_to_miles(distance_meters(station, reporting_location));

    summary.push_str(&format!("Weather station location: {station}\n"));
    summary.push_str(&format!("Reporting location      : {reporting_location}\n"));
    summary.push_str(&format!("Reporting location is {miles:.2} miles from weather station\n"));

    Ok(summary)
}

/// Fetch, normalize and render today's report for `reporting_location`.
pub async fn create_weather_summary(
    provider: &dyn WeatherProvider,
    reporting_location: Coordinates,
) -> Result<String, ReportError> {
    let today = Local::now().date_naive();
    create_weather_summary_at(provider, reporting_location, today, &Local).await
}

/// [`create_weather_summary`] with the calendar day and time zone supplied.
///
/// The two provider calls run one after the other; either failing aborts the
/// report.
pub async fn create_weather_summary_at<Tz>(
    provider: &dyn WeatherProvider,
    reporting_location: Coordinates,
    today: NaiveDate,
    tz: &Tz,
) -> Result<String, ReportError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let midnight = local_midnight(tz, today)?;

    info!("fetching current conditions and forecast for {reporting_location}");
    let forecast = provider.fetch_current_and_forecast(reporting_location).await?;

    info!("fetching observed conditions since {midnight}");
    let actuals = provider.fetch_historical(reporting_location, midnight).await?;

    let forecast = normalize_in(tz, forecast)?;
    let actuals = normalize_in(tz, actuals)?;

    summary_weather_report(&forecast, &actuals, reporting_location, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProviderError, RawWeatherPayload};
    use async_trait::async_trait;
    use chrono::Utc;
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    const TODAY_MIDNIGHT: i64 = 1_608_336_000; // 2020-12-19 00:00:00 UTC
    const HOUR: i64 = 3600;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 12, 19).unwrap()
    }

    fn reporting() -> Coordinates {
        Coordinates { latitude: 42.40, longitude: -71.10 }
    }

    fn conditions(dt: i64, temp: f64) -> Value {
        json!({
            "dt": dt,
            "temp": temp,
            "wind_speed": 4.7,
            "wind_deg": 270,
            "humidity": 65,
            "clouds": 20,
            "weather": [{"description": "few clouds"}]
        })
    }

    fn forecast_payload() -> Value {
        let mut current = conditions(TODAY_MIDNIGHT + 14 * HOUR, 38.5);
        current["sunrise"] = json!(TODAY_MIDNIGHT + 7 * HOUR + 7 * 60);
        current["sunset"] = json!(TODAY_MIDNIGHT + 16 * HOUR + 13 * 60);

        json!({
            "lat": 42.36,
            "lon": -71.06,
            "timezone_offset": 0,
            "current": current,
            "daily": [{
                "dt": TODAY_MIDNIGHT + 12 * HOUR,
                "sunrise": TODAY_MIDNIGHT + 7 * HOUR,
                "sunset": TODAY_MIDNIGHT + 16 * HOUR,
                "temp": {"day": 37.0, "min": 28.1, "max": 40.2},
                "wind_speed": 9.1,
                "wind_deg": 0,
                "snow": 3.2,
                "clouds": 90,
                "weather": [{"description": "snow"}]
            }],
            "hourly": [conditions(TODAY_MIDNIGHT + 15 * HOUR, 37.0)]
        })
    }

    fn history_payload() -> Value {
        let hourly: Vec<Value> = [16, 6, 7, 8, 10, 13]
            .into_iter()
            .map(|h| conditions(TODAY_MIDNIGHT + h * HOUR, 30.0 + h as f64))
            .collect();

        json!({
            "lat": 42.36,
            "lon": -71.06,
            "timezone_offset": 0,
            "current": {
                "dt": TODAY_MIDNIGHT,
                "sunrise": TODAY_MIDNIGHT + 7 * HOUR,
                "sunset": TODAY_MIDNIGHT + 16 * HOUR,
                "wind_speed": 1,
                "clouds": 0,
                "weather": []
            },
            "hourly": hourly
        })
    }

    #[derive(Debug)]
    struct StaticProvider {
        forecast: Value,
        history: Value,
        history_timestamp: Mutex<Option<i64>>,
    }

    impl StaticProvider {
        fn new(forecast: Value, history: Value) -> Self {
            Self { forecast, history, history_timestamp: Mutex::new(None) }
        }
    }

    #[async_trait]
    impl WeatherProvider for StaticProvider {
        async fn fetch_current_and_forecast(
            &self,
            _location: Coordinates,
        ) -> Result<RawWeatherPayload, ProviderError> {
            Ok(RawWeatherPayload::try_from(self.forecast.clone()).unwrap())
        }

        async fn fetch_historical(
            &self,
            _location: Coordinates,
            timestamp: i64,
        ) -> Result<RawWeatherPayload, ProviderError> {
            *self.history_timestamp.lock().unwrap() = Some(timestamp);
            Ok(RawWeatherPayload::try_from(self.history.clone()).unwrap())
        }
    }

    #[derive(Debug)]
    struct FailingHistory;

    #[async_trait]
    impl WeatherProvider for FailingHistory {
        async fn fetch_current_and_forecast(
            &self,
            _location: Coordinates,
        ) -> Result<RawWeatherPayload, ProviderError> {
            Ok(RawWeatherPayload::try_from(forecast_payload()).unwrap())
        }

        async fn fetch_historical(
            &self,
            _location: Coordinates,
            _timestamp: i64,
        ) -> Result<RawWeatherPayload, ProviderError> {
            Err(ProviderError::Status {
                endpoint: "timemachine",
                status: StatusCode::UNAUTHORIZED,
                body: "{\"cod\":401}".to_string(),
            })
        }
    }

    async fn report_for(provider: &StaticProvider) -> Result<String, ReportError> {
        create_weather_summary_at(provider, reporting(), today(), &Utc).await
    }

    #[tokio::test]
    async fn history_is_requested_from_local_midnight() {
        let provider = StaticProvider::new(forecast_payload(), history_payload());
        report_for(&provider).await.unwrap();

        assert_eq!(*provider.history_timestamp.lock().unwrap(), Some(TODAY_MIDNIGHT));
    }

    #[tokio::test]
    async fn report_has_four_hour_blocks_in_fixed_order() {
        let provider = StaticProvider::new(forecast_payload(), history_payload());
        let report = report_for(&provider).await.unwrap();

        let headers: Vec<&str> =
            report.lines().filter(|line| line.starts_with("Conditions at ")).collect();
        assert_eq!(
            headers,
            [
                "Conditions at 2020-12-19 07:00:00",
                "Conditions at 2020-12-19 10:00:00",
                "Conditions at 2020-12-19 13:00:00",
                "Conditions at 2020-12-19 16:00:00",
            ]
        );
        assert!(report.contains("Conditions at 2020-12-19 16:00:00\nTemperature: 46.0 °F\n"));
    }

    #[tokio::test]
    async fn report_layout() {
        let provider = StaticProvider::new(forecast_payload(), history_payload());
        let report = report_for(&provider).await.unwrap();

        assert!(report.starts_with(
            "Current Conditions 2020-12-19 14:00:00\n\
             Temperature: 38.5 °F\n\
             Wind: 4.7 mph from W\n\
             Humidity: 65 %\n\
             Description: few clouds, 20% cloudy\n\
             Sunrise: 2020-12-19 07:07:00\n\
             Sunset : 2020-12-19 16:13:00\n\
             \n\
             Forecast 2020-12-19 14:00:00\n\
             Wind: 9.1 mph\n\
             Snow: 3.2 mm\n\
             Description: snow, 90% cloudy\n\
             \n\
             Conditions at 2020-12-19 07:00:00\n"
        ));
        assert!(report.contains(
            "Weather station location: (42.36, -71.06)\n\
             Reporting location      : (42.4, -71.1)\n"
        ));
    }

    #[tokio::test]
    async fn forecast_block_never_shows_sun_times() {
        let provider = StaticProvider::new(forecast_payload(), history_payload());
        let report = report_for(&provider).await.unwrap();

        let forecast_block = report
            .split("\n\n")
            .find(|block| block.starts_with("Forecast "))
            .unwrap();
        assert!(!forecast_block.contains("Sunrise"));
        assert!(!forecast_block.contains("Sunset"));
    }

    #[tokio::test]
    async fn distance_line_matches_geodesy() {
        let provider = StaticProvider::new(forecast_payload(), history_payload());
        let report = report_for(&provider).await.unwrap();

        let station = Coordinates { latitude: 42.36, longitude: -71.06 };
        let expected = distance_meters(station, reporting()) * 0.00062137119;
        assert!(report.ends_with(&format!(
            "Reporting location is {expected:.2} miles from weather station\n"
        )));
    }

    #[tokio::test]
    async fn missing_hours_are_skipped() {
        let mut history = history_payload();
        history["hourly"] = json!([conditions(TODAY_MIDNIGHT + 10 * HOUR, 40.0)]);
        let provider = StaticProvider::new(forecast_payload(), history);

        let report = report_for(&provider).await.unwrap();
        assert_eq!(report.matches("Conditions at ").count(), 1);
        assert!(report.contains("Conditions at 2020-12-19 10:00:00\n"));
    }

    #[tokio::test]
    async fn history_without_hourly_still_reports() {
        let mut history = history_payload();
        history.as_object_mut().unwrap().remove("hourly");
        let provider = StaticProvider::new(forecast_payload(), history);

        let report = report_for(&provider).await.unwrap();
        assert!(!report.contains("Conditions at "));
        assert!(report.contains("miles from weather station"));
    }

    #[tokio::test]
    async fn missing_current_is_malformed() {
        let mut forecast = forecast_payload();
        forecast.as_object_mut().unwrap().remove("current");
        let provider = StaticProvider::new(forecast, history_payload());

        let err = report_for(&provider).await.unwrap_err();
        assert!(matches!(err, ReportError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn provider_failure_aborts_the_report() {
        let err = create_weather_summary_at(&FailingHistory, reporting(), today(), &Utc)
            .await
            .unwrap_err();

        assert!(matches!(err, ReportError::Provider(ProviderError::Status { .. })));
        assert!(err.to_string().contains("401"));
    }
}
