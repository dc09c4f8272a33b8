//! Coordinate resolution for scraped stores.
//!
//! Two rate-limited lookup clients ([`OverpassClient`] for named points of
//! interest, [`NominatimClient`] for postal addresses) feed a tiered
//! [`Resolver`] that picks a final coordinate, a source and a confidence
//! label for each store and persists it through a [`StoreRepository`].

pub mod distance;
pub mod lookup;
pub mod nominatim;
pub mod overpass;
pub mod repository;
pub mod resolve;
pub mod throttle;

pub use distance::{haversine_distance, EARTH_RADIUS_M};
pub use lookup::{Lookup, LookupError};
pub use nominatim::NominatimClient;
pub use overpass::{
    extract_base_name, validate_against_known_point, OverpassClient, OverpassSettings, PoiAddress,
    PoiCandidate, PoiValidation,
};
pub use repository::{PgStoreRepository, StoreRepository};
pub use resolve::{
    country_name, BatchStats, ResolveError, Resolver, ResolverSettings, StoreGeocodeResult,
};
pub use throttle::Throttle;
