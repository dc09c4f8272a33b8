#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use wiremock::MockServer;

use storegeo_core::{Coordinate, ResolutionOutcome, StoreRecord};
use storegeo_geocode::{
    NominatimClient, OverpassClient, OverpassSettings, Resolver, ResolverSettings,
    StoreRepository,
};

pub const OVERPASS_PATH: &str = "/api/interpreter";
pub const NOMINATIM_PATH: &str = "/search";

#[derive(Debug, thiserror::Error)]
#[error("in-memory repository: {0}")]
pub struct MemoryError(pub String);

/// `StoreRepository` over a map, with optional write failures.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    stores: Mutex<BTreeMap<i64, StoreRecord>>,
    fail_applies: bool,
}

impl MemoryRepository {
    pub fn with_stores(stores: Vec<StoreRecord>) -> Self {
        Self {
            stores: Mutex::new(stores.into_iter().map(|s| (s.market_id, s)).collect()),
            fail_applies: false,
        }
    }

    pub fn failing_applies(mut self) -> Self {
        self.fail_applies = true;
        self
    }

    pub fn store(&self, market_id: i64) -> StoreRecord {
        self.stores.lock().unwrap()[&market_id].clone()
    }
}

impl StoreRepository for MemoryRepository {
    type Error = MemoryError;

    async fn list_pending(&self, limit: Option<i64>) -> Result<Vec<StoreRecord>, MemoryError> {
        let stores = self.stores.lock().unwrap();
        let pending = stores.values().filter(|s| !s.osm_checked).cloned();
        Ok(match limit {
            Some(n) => pending.take(usize::try_from(n).unwrap()).collect(),
            None => pending.collect(),
        })
    }

    async fn get(&self, market_id: i64) -> Result<Option<StoreRecord>, MemoryError> {
        Ok(self.stores.lock().unwrap().get(&market_id).cloned())
    }

    async fn apply_resolution(
        &self,
        market_id: i64,
        outcome: &ResolutionOutcome,
    ) -> Result<(), MemoryError> {
        if self.fail_applies {
            return Err(MemoryError("constraint violation".to_owned()));
        }
        let mut stores = self.stores.lock().unwrap();
        let store = stores
            .get_mut(&market_id)
            .ok_or_else(|| MemoryError(format!("store {market_id} missing")))?;
        store.apply_resolution(outcome, Utc::now());
        Ok(())
    }

    async fn mark_checked(&self, market_id: i64) -> Result<(), MemoryError> {
        let mut stores = self.stores.lock().unwrap();
        let store = stores
            .get_mut(&market_id)
            .ok_or_else(|| MemoryError(format!("store {market_id} missing")))?;
        store.mark_checked(Utc::now());
        Ok(())
    }
}

pub fn store(
    market_id: i64,
    name: &str,
    scraped: Option<Coordinate>,
    street: &str,
    zip: &str,
    city: &str,
) -> StoreRecord {
    let mut record = StoreRecord::new(market_id, name, Utc::now());
    record.scraped = scraped;
    record.street = Some(street.to_owned());
    record.zip = Some(zip.to_owned());
    record.city = Some(city.to_owned());
    record.country_code = Some("DE".to_owned());
    record
}

pub fn overpass_settings(server: &MockServer, daily_limit: u32) -> OverpassSettings {
    OverpassSettings {
        url: format!("{}{OVERPASS_PATH}", server.uri()),
        timeout: Duration::from_secs(2),
        user_agent: "storegeo-test/0.1".to_owned(),
        min_interval: Duration::ZERO,
        daily_limit,
    }
}

pub fn overpass_client(server: &MockServer) -> OverpassClient {
    OverpassClient::new(overpass_settings(server, 10_000)).expect("failed to build OverpassClient")
}

pub fn nominatim_client(server: &MockServer) -> NominatimClient {
    NominatimClient::new(
        &format!("{}{NOMINATIM_PATH}", server.uri()),
        2,
        "storegeo-test/0.1",
    )
    .expect("failed to build NominatimClient")
}

pub fn resolver(server: &MockServer) -> Resolver {
    Resolver::new(
        overpass_client(server),
        nominatim_client(server),
        ResolverSettings::default(),
    )
}

pub fn elements(elements: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "version": 0.6, "elements": elements })
}

/// Matches Overpass requests whose decoded `data` form field contains a
/// given fragment.
pub struct QueryContains(String);

pub fn query_contains(fragment: &str) -> QueryContains {
    QueryContains(fragment.to_owned())
}

impl wiremock::Match for QueryContains {
    fn matches(&self, request: &wiremock::Request) -> bool {
        overpass_query(request).is_some_and(|q| q.contains(&self.0))
    }
}

pub fn overpass_query(request: &wiremock::Request) -> Option<String> {
    let body = std::str::from_utf8(&request.body).ok()?;
    let url = reqwest::Url::parse(&format!("http://localhost/?{body}")).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "data")
        .map(|(_, value)| value.into_owned())
}
