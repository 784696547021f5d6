//! Geographic utilities.
//!
//! Distances here are in kilometres on a spherical Earth of radius 6371 km.

use crate::GpsPoint;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lon1 = p1.longitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let lon2 = p2.longitude.to_radians();

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Total length of a path in kilometres, skipping missing points.
///
/// Each present point is joined to the previous present point, so a gap in
/// coverage does not break the path.
pub fn path_length_km<I>(points: I) -> f64
where
    I: IntoIterator<Item = Option<GpsPoint>>,
{
    let mut total = 0.0;
    let mut previous: Option<GpsPoint> = None;

    for point in points.into_iter().flatten() {
        if let Some(prev) = previous {
            total += haversine_km(&prev, &point);
        }
        previous = Some(point);
    }

    total
}
