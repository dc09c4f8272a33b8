//! Coordinate type shared by the scraper, the database layer, and the
//! geocoding engine.

use serde::{Deserialize, Serialize};

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Convert a raw feed coordinate pair into a usable point.
    ///
    /// The upstream feed encodes "unknown" as `0` in either component, so a
    /// pair is usable only when both components are present, finite, non-zero
    /// and inside the valid latitude/longitude ranges. This is the only place
    /// the `(0,0)` sentinel is interpreted.
    #[must_use]
    pub fn from_feed(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        let (lat, lon) = (latitude?, longitude?);
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if lat == 0.0 || lon == 0.0 {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self::new(lat, lon))
    }

    /// Parse a `"lat,lon"` pair as used by configuration values.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the string is not two
    /// comma-separated finite numbers within range.
    pub fn parse_pair(raw: &str) -> Result<Self, String> {
        let (lat, lon) = raw
            .split_once(',')
            .ok_or_else(|| format!("expected \"lat,lon\", got \"{raw}\""))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("invalid latitude \"{}\": {e}", lat.trim()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|e| format!("invalid longitude \"{}\": {e}", lon.trim()))?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(format!("coordinate out of range: {lat},{lon}"));
        }
        Ok(Self::new(lat, lon))
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_sentinel_is_not_a_coordinate() {
        assert_eq!(Coordinate::from_feed(Some(0.0), Some(0.0)), None);
        assert_eq!(Coordinate::from_feed(Some(49.6), Some(0.0)), None);
        assert_eq!(Coordinate::from_feed(Some(0.0), Some(11.0)), None);
    }

    #[test]
    fn feed_missing_component_is_not_a_coordinate() {
        assert_eq!(Coordinate::from_feed(None, Some(11.0)), None);
        assert_eq!(Coordinate::from_feed(Some(49.6), None), None);
    }

    #[test]
    fn feed_out_of_range_is_rejected() {
        assert_eq!(Coordinate::from_feed(Some(91.0), Some(11.0)), None);
        assert_eq!(Coordinate::from_feed(Some(49.6), Some(-181.0)), None);
        assert_eq!(Coordinate::from_feed(Some(f64::NAN), Some(11.0)), None);
    }

    #[test]
    fn feed_valid_pair_is_kept() {
        let c = Coordinate::from_feed(Some(49.6004), Some(11.0071)).unwrap();
        assert!((c.latitude - 49.6004).abs() < f64::EPSILON);
        assert!((c.longitude - 11.0071).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_pair_accepts_spaces() {
        let c = Coordinate::parse_pair("51.1657, 10.4515").unwrap();
        assert!((c.latitude - 51.1657).abs() < f64::EPSILON);
        assert!((c.longitude - 10.4515).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_pair_rejects_garbage() {
        assert!(Coordinate::parse_pair("51.1657").is_err());
        assert!(Coordinate::parse_pair("north,east").is_err());
        assert!(Coordinate::parse_pair("100,10").is_err());
    }
}
