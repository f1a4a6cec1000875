//! Geographic coordinates and distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for every distance computation, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point on the map in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Move a fraction of the way toward `target` (linear in degrees).
    ///
    /// `fraction` is clamped to `[0, 1]`; `1.0` lands exactly on `target`.
    pub fn step_toward(self, target: Self, fraction: f64) -> Self {
        let t = fraction.clamp(0.0, 1.0);
        Self {
            latitude: (target.latitude - self.latitude).mul_add(t, self.latitude),
            longitude: (target.longitude - self.longitude).mul_add(t, self.longitude),
        }
    }
}

impl core::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Great-circle (haversine) distance between two coordinates in meters.
pub fn distance_in_meters(from: GeoCoordinate, to: GeoCoordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let h = (lat1.cos() * lat2.cos())
        .mul_add((d_lon / 2.0).sin().powi(2), (d_lat / 2.0).sin().powi(2));
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meters_per_degree() -> f64 {
        EARTH_RADIUS_METERS * core::f64::consts::PI / 180.0
    }

    #[test]
    fn zero_distance_to_self() {
        let p = GeoCoordinate::new(51.5, -0.12);
        assert!(distance_in_meters(p, p).abs() < 1e-9);
    }

    #[test]
    fn three_four_five_in_degree_units() {
        let origin = GeoCoordinate::new(0.0, 0.0);
        let b = GeoCoordinate::new(3.0, 4.0);
        let degrees = distance_in_meters(origin, b) / meters_per_degree();
        assert!((degrees - 5.0).abs() < 0.01, "got {degrees}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoCoordinate::new(40.7128, -74.0060);
        let b = GeoCoordinate::new(40.7306, -73.9352);
        let ab = distance_in_meters(a, b);
        let ba = distance_in_meters(b, a);
        assert!((ab - ba).abs() < 1e-6);
        // Lower Manhattan to Williamsburg is roughly 6 km.
        assert!(ab > 5_500.0 && ab < 6_500.0, "got {ab}");
    }

    #[test]
    fn step_toward_clamps() {
        let a = GeoCoordinate::new(0.0, 0.0);
        let b = GeoCoordinate::new(2.0, -2.0);
        assert_eq!(a.step_toward(b, 1.5), b);
        assert_eq!(a.step_toward(b, -1.0), a);
        let mid = a.step_toward(b, 0.5);
        assert!((mid.latitude - 1.0).abs() < 1e-12);
        assert!((mid.longitude + 1.0).abs() < 1e-12);
    }
}
