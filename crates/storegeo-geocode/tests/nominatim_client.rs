//! `NominatimClient` against a local `wiremock` server.

mod common;

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storegeo_core::Coordinate;
use storegeo_geocode::{Lookup, LookupError};

use common::{nominatim_client, NOMINATIM_PATH};

fn berlin() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!([
        {
            "place_id": 1,
            "lat": "52.5200",
            "lon": "13.4050",
            "display_name": "Teststraße 1, Teststadt, Germany"
        }
    ]))
}

#[tokio::test]
async fn geocode_sends_expected_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NOMINATIM_PATH))
        .and(header("user-agent", "storegeo-test/0.1"))
        .and(query_param("q", "Teststraße 1, 12345, Teststadt, Germany"))
        .and(query_param("format", "json"))
        .and(query_param("limit", "1"))
        .and(query_param("addressdetails", "0"))
        .respond_with(berlin())
        .expect(1)
        .mount(&server)
        .await;

    let client = nominatim_client(&server);
    let result = client
        .geocode(
            Some("Teststraße 1"),
            Some("Teststadt"),
            Some("12345"),
            Some("Germany"),
        )
        .await
        .found()
        .expect("expected a geocode result");

    assert_eq!(result.coordinate, Coordinate::new(52.52, 13.405));
    assert_eq!(result.display_name, "Teststraße 1, Teststadt, Germany");
}

#[tokio::test]
async fn missing_display_name_defaults_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NOMINATIM_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "lat": "49.6", "lon": "11.0" }])),
        )
        .mount(&server)
        .await;

    let client = nominatim_client(&server);
    let result = client
        .geocode(None, Some("Erlangen"), None, None)
        .await
        .found()
        .expect("expected a geocode result");
    assert_eq!(result.display_name, "");
}

#[tokio::test]
async fn zero_results_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NOMINATIM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = nominatim_client(&server);
    let lookup = client.geocode(Some("Nirgendwo 1"), None, None, None).await;
    assert!(matches!(lookup, Lookup::NotFound));
}

#[tokio::test]
async fn server_error_is_failed_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NOMINATIM_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = nominatim_client(&server);
    let lookup = client.geocode(None, Some("Erlangen"), None, None).await;
    assert!(matches!(
        lookup,
        Lookup::Failed(LookupError::UnexpectedStatus { status: 500 })
    ));
}

#[tokio::test]
async fn unparsable_coordinate_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NOMINATIM_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "lat": "north", "lon": "11.0" }])),
        )
        .mount(&server)
        .await;

    let client = nominatim_client(&server);
    let lookup = client.geocode(None, Some("Erlangen"), None, None).await;
    assert!(matches!(lookup, Lookup::Failed(LookupError::Malformed { .. })));
}

#[tokio::test]
async fn empty_address_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(berlin())
        .expect(0)
        .mount(&server)
        .await;

    let client = nominatim_client(&server);
    let lookup = client.geocode(None, Some("  "), None, None).await;
    assert!(matches!(lookup, Lookup::NotFound));
}

#[tokio::test]
async fn consecutive_requests_are_one_second_apart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(NOMINATIM_PATH))
        .respond_with(berlin())
        .expect(2)
        .mount(&server)
        .await;

    let client = nominatim_client(&server);
    let start = Instant::now();
    assert!(client
        .geocode(None, Some("Teststadt"), None, None)
        .await
        .found()
        .is_some());
    assert!(client
        .geocode(None, Some("Teststadt"), None, None)
        .await
        .found()
        .is_some());
    assert!(start.elapsed() >= Duration::from_secs(1));
}
