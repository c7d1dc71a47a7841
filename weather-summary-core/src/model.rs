use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ReportError;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ReportError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ReportError::InvalidCoordinates { latitude, longitude });
        }

        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinates {
    // `{:?}` keeps the trailing `.0` on whole degrees, e.g. `(42.0, -71.25)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.latitude, self.longitude)
    }
}

/// Provider JSON document exactly as received.
///
/// Known top-level keys are `current`, `hourly`, `daily`, `lat`, `lon` and
/// `timezone_offset`; any of the three weather sections may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawWeatherPayload(Map<String, Value>);

impl RawWeatherPayload {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The `current` object. A `null` or empty object counts as absent.
    pub fn current(&self) -> Result<Option<&Map<String, Value>>, ReportError> {
        match self.0.get("current") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(obj)) if obj.is_empty() => Ok(None),
            Some(Value::Object(obj)) => Ok(Some(obj)),
            Some(other) => Err(ReportError::malformed(format!(
                "`current` must be an object, found {}",
                json_kind(other)
            ))),
        }
    }

    pub fn hourly(&self) -> Result<Option<&[Value]>, ReportError> {
        self.section("hourly")
    }

    pub fn daily(&self) -> Result<Option<&[Value]>, ReportError> {
        self.section("daily")
    }

    fn section(&self, key: &str) -> Result<Option<&[Value]>, ReportError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) if items.is_empty() => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.as_slice())),
            Some(other) => Err(ReportError::malformed(format!(
                "`{key}` must be an array, found {}",
                json_kind(other)
            ))),
        }
    }

    /// Seconds east of UTC for the requested location.
    pub fn timezone_offset(&self) -> Result<i64, ReportError> {
        self.0
            .get("timezone_offset")
            .and_then(Value::as_i64)
            .ok_or_else(|| ReportError::malformed("missing integer `timezone_offset`"))
    }

    /// Location the provider reports the data for.
    pub fn station_location(&self) -> Result<Coordinates, ReportError> {
        let coord = |key: &str| {
            self.0
                .get(key)
                .and_then(Value::as_f64)
                .ok_or_else(|| ReportError::malformed(format!("missing numeric `{key}`")))
        };

        Ok(Coordinates { latitude: coord("lat")?, longitude: coord("lon")? })
    }
}

impl From<Map<String, Value>> for RawWeatherPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RawWeatherPayload {
    type Error = ReportError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ReportError::malformed(format!(
                "payload must be an object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One scalar cell of a flattened weather record.
///
/// Missing data is always [`FieldValue::Empty`], whether the provider omitted
/// the key for this entry or sent `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Arrays are not flattened (e.g. `weather: [{description}]`).
    List(Vec<Value>),
}

impl FieldValue {
    /// Whether the field carries data: non-empty and non-zero.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Empty => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::List(items) => !items.is_empty(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Epoch seconds, truncating any fractional part towards the past.
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|v| v.floor() as i64)),
            _ => None,
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Empty,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => FieldValue::Number(n.clone()),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(items.clone()),
            Value::Object(_) => FieldValue::Text(value.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => write!(f, "{}", Value::Array(items.clone())),
        }
    }
}

static EMPTY: FieldValue = FieldValue::Empty;

/// A flat, single-level weather record keyed by (possibly dotted) field name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl WeatherRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The field's value, or [`FieldValue::Empty`] when the column does not exist.
    pub fn field(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&EMPTY)
    }

    /// The field's value; a missing column is a malformed payload.
    pub fn require(&self, name: &str) -> Result<&FieldValue, ReportError> {
        self.fields
            .get(name)
            .ok_or_else(|| ReportError::malformed(format!("record has no `{name}` field")))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BTreeMap<String, FieldValue>> for WeatherRecord {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for WeatherRecord {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

/// Flat records for the three sections of one payload, plus the payload itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedResultSet {
    pub raw: RawWeatherPayload,
    pub current: Option<WeatherRecord>,
    /// Index 0 is today.
    pub daily: Vec<WeatherRecord>,
    pub hourly: Vec<WeatherRecord>,
}
