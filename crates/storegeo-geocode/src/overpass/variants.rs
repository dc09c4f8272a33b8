//! Name-variant retry and agreement check for point-of-interest matches.

use serde::{Deserialize, Serialize};

use storegeo_core::Coordinate;

use super::{OverpassClient, PoiCandidate};
use crate::distance::haversine_distance;
use crate::lookup::{Lookup, LookupError};

/// Strips a trailing city token: names with more than two words lose their
/// last word, shorter names are returned unchanged.
#[must_use]
pub fn extract_base_name(store_name: &str) -> String {
    let tokens: Vec<&str> = store_name.split_whitespace().collect();
    if tokens.len() > 2 {
        tokens[..tokens.len() - 1].join(" ")
    } else {
        store_name.to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameVariant {
    Exact(String),
    Fuzzy(&'static str),
}

impl NameVariant {
    fn label(&self) -> String {
        match self {
            NameVariant::Exact(name) => name.clone(),
            NameVariant::Fuzzy(token) => format!("fuzzy:{token}"),
        }
    }
}

/// Brand spelling swaps tried after the plain base name.
const SPELLING_SWAPS: [(&str, &str); 2] = [("BioMarkt", "Biomarkt"), ("Denns", "denn's")];

/// Brand tokens for fuzzy shop matching, apostrophe form first.
const FUZZY_TOKENS: [&str; 2] = ["denn's", "Denns"];

fn name_variants(store_name: &str) -> Vec<NameVariant> {
    let base = extract_base_name(store_name);
    let mut variants: Vec<NameVariant> = Vec::with_capacity(5);

    let exact = std::iter::once(base.clone())
        .chain(SPELLING_SWAPS.iter().map(|(from, to)| base.replace(from, to)));
    for name in exact {
        if name.trim().is_empty() {
            continue;
        }
        let variant = NameVariant::Exact(name);
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants.extend(FUZZY_TOKENS.iter().map(|&t| NameVariant::Fuzzy(t)));
    variants
}

impl OverpassClient {
    /// Tries the store's name variants in order and returns the first match,
    /// tagged with the variant that produced it.
    ///
    /// Sends at most five queries, one per distinct variant. An exact name
    /// that repeats an earlier one is not sent again.
    ///
    /// Stops early once the query ceiling is reached. Returns
    /// [`Lookup::Failed`] only when no attempt got an answer from the
    /// service; otherwise an exhausted search is [`Lookup::NotFound`].
    pub async fn search_with_variants(
        &self,
        store_name: &str,
        center: Coordinate,
        radius_m: u32,
    ) -> Lookup<PoiCandidate> {
        let mut answered = false;
        let mut last_error: Option<LookupError> = None;

        for variant in name_variants(store_name) {
            let lookup = match &variant {
                NameVariant::Exact(name) => self.search_exact(name, center, radius_m).await,
                NameVariant::Fuzzy(token) => {
                    self.search_fuzzy(&regex::escape(token), center, radius_m)
                        .await
                }
            };
            match lookup {
                Lookup::Found(mut candidate) => {
                    let label = variant.label();
                    tracing::info!(
                        store_name,
                        variant = %label,
                        osm_id = candidate.osm_id,
                        "point of interest matched"
                    );
                    candidate.matched_variant = Some(label);
                    return Lookup::Found(candidate);
                }
                Lookup::NotFound => answered = true,
                Lookup::Failed(err @ LookupError::QuotaExhausted { .. }) => {
                    last_error = Some(err);
                    break;
                }
                Lookup::Failed(err) => last_error = Some(err),
            }
        }

        match last_error {
            Some(err) if !answered => Lookup::Failed(err),
            _ => Lookup::NotFound,
        }
    }
}

/// Distance between a POI and a known point, and whether they agree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoiValidation {
    pub distance_m: f64,
    /// `true` when `distance_m` is strictly below the threshold.
    pub agrees: bool,
}

#[must_use]
pub fn validate_against_known_point(
    poi: Coordinate,
    known: Coordinate,
    threshold_m: f64,
) -> PoiValidation {
    let distance_m = haversine_distance(poi, known);
    PoiValidation {
        distance_m,
        agrees: distance_m < threshold_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_drops_trailing_city() {
        assert_eq!(extract_base_name("Denns BioMarkt Erlangen"), "Denns BioMarkt");
        assert_eq!(extract_base_name("Denns BioMarkt Bad Tölz"), "Denns BioMarkt Bad");
    }

    #[test]
    fn short_names_are_kept() {
        assert_eq!(extract_base_name("Speisekammer Hof"), "Speisekammer Hof");
        assert_eq!(extract_base_name("Biomarkt"), "Biomarkt");
        assert_eq!(extract_base_name(""), "");
    }

    #[test]
    fn variants_follow_fixed_order() {
        let labels: Vec<String> = name_variants("Denns BioMarkt Erlangen")
            .iter()
            .map(NameVariant::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Denns BioMarkt",
                "Denns Biomarkt",
                "denn's BioMarkt",
                "fuzzy:denn's",
                "fuzzy:Denns",
            ]
        );
    }

    #[test]
    fn identical_variants_are_tried_once() {
        let labels: Vec<String> = name_variants("Speisekammer Hof")
            .iter()
            .map(NameVariant::label)
            .collect();
        assert_eq!(labels, vec!["Speisekammer Hof", "fuzzy:denn's", "fuzzy:Denns"]);
    }

    #[test]
    fn empty_name_only_tries_fuzzy() {
        assert_eq!(
            name_variants(""),
            vec![NameVariant::Fuzzy("denn's"), NameVariant::Fuzzy("Denns")]
        );
    }

    #[test]
    fn validation_threshold_is_exclusive() {
        let known = Coordinate::new(49.6004, 11.0071);
        let near = validate_against_known_point(Coordinate::new(49.6005, 11.0071), known, 100.0);
        assert!(near.agrees);
        assert!(near.distance_m < 20.0);

        let far = validate_against_known_point(Coordinate::new(49.57889, 11.00271), known, 100.0);
        assert!(!far.agrees);

        let at = validate_against_known_point(known, known, 0.0);
        assert!(!at.agrees);
    }
}
