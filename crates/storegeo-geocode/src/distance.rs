//! Great-circle distance between two coordinates.

use storegeo_core::Coordinate;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between `a` and `b` in meters.
#[must_use]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAMBERG_SCRAPED: Coordinate = Coordinate::new(49.8968, 10.8939);
    const BAMBERG_POI: Coordinate = Coordinate::new(49.89702, 10.89408);
    const ERLANGEN_TURNSTRASSE: Coordinate = Coordinate::new(49.6004, 11.0071);
    const ERLANGEN_PAUL_GOSSEN: Coordinate = Coordinate::new(49.57889, 11.00271);

    #[test]
    fn same_point_is_zero() {
        assert!(haversine_distance(BAMBERG_SCRAPED, BAMBERG_SCRAPED).abs() < 1e-9);
    }

    #[test]
    fn short_distance_calibration() {
        let d = haversine_distance(BAMBERG_SCRAPED, BAMBERG_POI);
        assert!(d > 20.0 && d < 30.0, "got {d}");
    }

    #[test]
    fn long_distance_calibration() {
        let d = haversine_distance(ERLANGEN_TURNSTRASSE, ERLANGEN_PAUL_GOSSEN);
        assert!(d > 2300.0 && d < 2500.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (BAMBERG_SCRAPED, BAMBERG_POI),
            (ERLANGEN_TURNSTRASSE, ERLANGEN_PAUL_GOSSEN),
            (Coordinate::new(-33.8688, 151.2093), Coordinate::new(51.5074, -0.1278)),
        ];
        for (a, b) in pairs {
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            assert!((ab - ba).abs() < 1e-6, "{ab} != {ba}");
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
    }
}
