//! Rendering of a single [`WeatherRecord`] as a block of text lines.

use serde_json::Value;

use crate::{
    error::ReportError,
    model::{FieldValue, WeatherRecord},
    wind::wind_direction_label,
};

/// Render `record` as newline-terminated lines.
///
/// Optional lines only appear when their field carries data. A `wind_deg` of
/// zero reads as "no direction", and the sunset line is gated on `sunrise`
/// rather than `sunset`. `wind_speed`, `clouds` and `weather` are required.
pub fn conditions_summary(record: &WeatherRecord) -> Result<String, ReportError> {
    let mut out = String::new();

    for (field, label) in [
        ("temp", "Temperature"),
        ("temp_min", "Low temperature"),
        ("temp_max", "High temperature"),
    ] {
        let value = record.field(field);
        if value.is_present() {
            out.push_str(&format!("{label}: {value} °F\n"));
        }
    }

    let wind_deg = record.field("wind_deg");
    let wind_direction = if wind_deg.is_present() {
        let bearing = wind_deg.as_f64().ok_or_else(|| {
            ReportError::malformed(format!("`wind_deg` is not a number: {wind_deg}"))
        })?;
        format!(" from {}", wind_direction_label(bearing))
    } else {
        String::new()
    };
    out.push_str(&format!("Wind: {} mph{wind_direction}\n", record.require("wind_speed")?));

    for (field, label, unit) in
        [("rain", "Rain", "mm"), ("snow", "Snow", "mm"), ("humidity", "Humidity", "%")]
    {
        if let Some(value) = positive(record, field)? {
            out.push_str(&format!("{label}: {value} {unit}\n"));
        }
    }

    let clouds = record.require("clouds")?;
    let pct_cloudy = clouds
        .as_f64()
        .ok_or_else(|| ReportError::malformed(format!("`clouds` is not a number: {clouds}")))?;
    out.push_str(&format!(
        "Description: {}, {pct_cloudy:.0}% cloudy\n",
        descriptions(record.require("weather")?)?
    ));

    let sunrise = record.field("sunrise");
    if sunrise.is_present() {
        out.push_str(&format!("Sunrise: {sunrise}\n"));
        out.push_str(&format!("Sunset : {}\n", record.field("sunset")));
    }

    Ok(out)
}

/// The field if it is a number greater than zero. Empty means zero.
fn positive<'a>(
    record: &'a WeatherRecord,
    field: &str,
) -> Result<Option<&'a FieldValue>, ReportError> {
    let value = record.field(field);
    match value {
        FieldValue::Empty => Ok(None),
        FieldValue::Number(n) => Ok(n.as_f64().filter(|v| *v > 0.0).map(|_| value)),
        other => Err(ReportError::malformed(format!("`{field}` is not a number: {other}"))),
    }
}

fn descriptions(weather: &FieldValue) -> Result<String, ReportError> {
    let FieldValue::List(items) = weather else {
        return Err(ReportError::malformed(format!("`weather` is not a list: {weather}")));
    };

    let parts = items
        .iter()
        .map(|w| w.get("description").and_then(Value::as_str))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ReportError::malformed("`weather` entry without a `description`"))?;

    Ok(parts.join(", "))
}
