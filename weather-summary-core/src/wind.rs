//! Compass bearing to 16-point direction label.

pub const DIRECTION_LABELS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR_DEGREES: f64 = 360.0 / 16.0;
const HALF_SECTOR: f64 = SECTOR_DEGREES / 2.0;

/// Label whose sector contains `bearing`. Each label is centered on its
/// canonical bearing, so N covers `[348.75, 11.25)`.
pub fn wind_direction_label(bearing: f64) -> &'static str {
    // Rotate by half a sector so sector k is `[k * 22.5, (k + 1) * 22.5)`.
    let shifted = (bearing + HALF_SECTOR).rem_euclid(360.0);
    let sector = (shifted / SECTOR_DEGREES) as usize;
    DIRECTION_LABELS[sector % DIRECTION_LABELS.len()]
}
