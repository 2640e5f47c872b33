use crate::{BoundingBox, GeoPoint};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
/// Kilometres per degree used by the planar area approximation.
pub const KM_PER_DEGREE: f64 = 111.0;
pub const KM_PER_DEGREE_LNG: f64 = 111.32;
pub const KM_PER_DEGREE_LAT: f64 = 110.54;

/// Plain midpoint of the extents, not a geodesic centroid.
pub fn center(bounds: &BoundingBox) -> GeoPoint {
    GeoPoint {
        lat: (bounds.north + bounds.south) / 2.0,
        lng: (bounds.east + bounds.west) / 2.0,
    }
}

/// Flat-earth area approximation. Only meaningful for small boxes.
pub fn planar_area_km2(bounds: &BoundingBox) -> f64 {
    let lat_km = bounds.lat_span() * KM_PER_DEGREE;
    let mid_lat = ((bounds.north + bounds.south) / 2.0).to_radians();
    let lng_km = bounds.lng_span() * KM_PER_DEGREE * mid_lat.cos();
    lat_km * lng_km
}

/// Approximate (width, height) in kilometres.
pub fn dimensions_km(bounds: &BoundingBox) -> (f64, f64) {
    (
        bounds.lng_span() * KM_PER_DEGREE_LNG,
        bounds.lat_span() * KM_PER_DEGREE_LAT,
    )
}

/// Haversine distance in metres.
pub fn great_circle_distance_m(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}
