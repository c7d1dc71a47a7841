//! Metric to imperial distance conversion.

pub const MILES_PER_KILOMETER: f64 = 0.62137119;
pub const METERS_PER_KILOMETER: f64 = 1000.0;

pub fn meters_to_miles(meters: f64) -> f64 {
    (meters / METERS_PER_KILOMETER) * MILES_PER_KILOMETER
}
