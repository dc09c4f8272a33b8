//! Overpass JSON response model and closest-match selection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storegeo_core::Coordinate;

use crate::distance::haversine_distance;

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassElement {
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// OSM `addr:*` tags carried by a matched node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoiAddress {
    pub street: Option<String>,
    pub housenumber: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl PoiAddress {
    fn from_tags(tags: &BTreeMap<String, String>) -> Self {
        let tag = |key: &str| {
            tags.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Self {
            street: tag("addr:street"),
            housenumber: tag("addr:housenumber"),
            postcode: tag("addr:postcode"),
            city: tag("addr:city"),
            country: tag("addr:country"),
        }
    }

    /// `"<housenumber> <street>"`, or whichever part exists.
    #[must_use]
    pub fn street_line(&self) -> Option<String> {
        let line = format!(
            "{} {}",
            self.housenumber.as_deref().unwrap_or_default(),
            self.street.as_deref().unwrap_or_default()
        );
        let line = line.trim();
        (!line.is_empty()).then(|| line.to_owned())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A point of interest returned by a name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiCandidate {
    pub coordinate: Coordinate,
    pub name: String,
    pub osm_id: i64,
    pub address: PoiAddress,
    /// Which name variant produced the match, set by variant search.
    pub matched_variant: Option<String>,
}

impl PoiCandidate {
    fn from_element(element: &OverpassElement) -> Option<Self> {
        let coordinate = Coordinate::new(element.lat?, element.lon?);
        Some(Self {
            coordinate,
            name: element
                .tags
                .get("name")
                .cloned()
                .unwrap_or_else(|| "Unknown".to_owned()),
            osm_id: element.id,
            address: PoiAddress::from_tags(&element.tags),
            matched_variant: None,
        })
    }
}

/// Picks the element closest to `center`.
///
/// A single element is returned as-is. With several, the first element at
/// the minimum distance wins. Elements without a position are ignored.
pub(crate) fn closest_candidate(
    elements: &[OverpassElement],
    center: Coordinate,
) -> Option<PoiCandidate> {
    let mut candidates = elements.iter().filter_map(PoiCandidate::from_element);
    let first = candidates.next()?;
    let mut best_distance = haversine_distance(center, first.coordinate);
    let mut best = first;
    for candidate in candidates {
        let distance = haversine_distance(center, candidate.coordinate);
        if distance < best_distance {
            best_distance = distance;
            best = candidate;
        }
    }
    Some(best)
}
