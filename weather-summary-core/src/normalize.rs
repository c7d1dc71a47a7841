//! Raw provider JSON to flat [`WeatherRecord`]s.
//!
//! Nested objects become dotted columns (`rain: {"1h": 0.3}` → `rain.1h`),
//! arrays are kept whole, and every record of a section carries the union of
//! that section's columns with [`FieldValue::Empty`] filling the gaps.
//! Entries are never dropped or reordered.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    slice,
};

use chrono::TimeZone;
use log::debug;
use serde_json::{Map, Value};

use crate::{
    error::ReportError,
    model::{FieldValue, NormalizedResultSet, RawWeatherPayload, WeatherRecord},
    time::localize_in,
};

/// Normalize `raw`, formatting timestamps in `tz`.
///
/// Offsets differ by section: daily `dt` is shifted by the payload's
/// `timezone_offset`, while daily `sunrise`/`sunset` and every current and
/// hourly timestamp are not shifted at all.
pub fn normalize_in<Tz>(tz: &Tz, raw: RawWeatherPayload) -> Result<NormalizedResultSet, ReportError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let daily = match raw.daily()? {
        Some(entries) => {
            let mut records = flatten_section("daily", entries)?;
            let offset = raw.timezone_offset()?;
            for (field, field_offset) in [("dt", offset), ("sunrise", 0), ("sunset", 0)] {
                localize_field(tz, "daily", &mut records, field, field_offset)?;
            }
            records
        }
        None => Vec::new(),
    };

    let hourly = match raw.hourly()? {
        Some(entries) => {
            let mut records = flatten_section("hourly", entries)?;
            localize_field(tz, "hourly", &mut records, "dt", 0)?;
            records
        }
        None => Vec::new(),
    };

    let current = match raw.current()? {
        Some(obj) => {
            let entry = Value::Object(obj.clone());
            let mut records = flatten_section("current", slice::from_ref(&entry))?;
            for field in ["dt", "sunrise", "sunset"] {
                localize_field(tz, "current", &mut records, field, 0)?;
            }
            records.pop()
        }
        None => None,
    };

    debug!(
        "normalized payload: current={}, daily={}, hourly={}",
        current.is_some(),
        daily.len(),
        hourly.len()
    );

    Ok(NormalizedResultSet { raw, current, daily, hourly })
}

fn flatten_section(section: &str, entries: &[Value]) -> Result<Vec<WeatherRecord>, ReportError> {
    let flattened = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            Value::Object(obj) => {
                let mut fields = BTreeMap::new();
                flatten_into(None, obj, &mut fields);
                Ok(fields)
            }
            _ => Err(ReportError::malformed(format!("{section}[{i}] is not an object"))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let columns: BTreeSet<String> = flattened.iter().flat_map(|f| f.keys().cloned()).collect();

    Ok(flattened
        .into_iter()
        .map(|mut fields| {
            for column in &columns {
                fields.entry(column.clone()).or_default();
            }
            WeatherRecord::from(fields)
        })
        .collect())
}

fn flatten_into(
    prefix: Option<&str>,
    object: &Map<String, Value>,
    out: &mut BTreeMap<String, FieldValue>,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };

        match value {
            Value::Object(inner) => flatten_into(Some(&name), inner, out),
            other => {
                out.insert(name, FieldValue::from(other));
            }
        }
    }
}

fn localize_field<Tz>(
    tz: &Tz,
    section: &str,
    records: &mut [WeatherRecord],
    field: &str,
    offset: i64,
) -> Result<(), ReportError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    for (i, record) in records.iter_mut().enumerate() {
        let ts = record.field(field).as_timestamp().ok_or_else(|| {
            ReportError::malformed(format!("{section}[{i}] has no numeric `{field}` timestamp"))
        })?;

        record.insert(field, FieldValue::Text(localize_in(tz, ts, offset)?));
    }

    Ok(())
}
