use haversine::{Location as HaversineLocation, Units, distance};

use crate::{model::Coordinates, units::METERS_PER_KILOMETER};

/// Great-circle distance between two points, in meters.
pub fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let km = distance(
        HaversineLocation { latitude: a.latitude, longitude: a.longitude },
        HaversineLocation { latitude: b.latitude, longitude: b.longitude },
        Units::Kilometers,
    );
    km * METERS_PER_KILOMETER
}
