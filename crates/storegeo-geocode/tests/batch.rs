//! Batch orchestration over several stores.

mod common;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storegeo_core::Coordinate;
use storegeo_geocode::BatchStats;

use common::{elements, resolver, store, MemoryRepository, NOMINATIM_PATH, OVERPASS_PATH};

async fn mount_overpass_empty(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(OVERPASS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(elements(json!([]))))
        .mount(server)
        .await;
}

#[tokio::test]
async fn geocoder_failures_are_counted_and_checked() {
    let server = MockServer::start().await;
    mount_overpass_empty(&server).await;
    Mock::given(method("GET"))
        .and(path(NOMINATIM_PATH))
        .and(query_param("q", "Teststraße 1, 12345, Teststadt, Germany"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": "52.5200", "lon": "13.4050", "display_name": "Teststraße 1, Teststadt, Germany" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(NOMINATIM_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let repo = MemoryRepository::with_stores(vec![
        store(1, "Denns BioMarkt Teststadt", None, "Teststraße 1", "12345", "Teststadt"),
        store(2, "Denns BioMarkt Anderswo", None, "Weg 2", "22222", "Anderswo"),
        store(3, "Denns BioMarkt Irgendwo", None, "Pfad 3", "33333", "Irgendwo"),
    ]);

    let stats = resolver(&server).geocode_pending(&repo, None).await.unwrap();
    assert_eq!(
        stats,
        BatchStats {
            total: 3,
            successful: 1,
            failed: 2
        }
    );
    for market_id in [1, 2, 3] {
        assert!(repo.store(market_id).osm_checked, "store {market_id}");
    }
    assert_eq!(
        repo.store(1).final_coordinate,
        Some(Coordinate::new(52.52, 13.405))
    );
    assert!(repo.store(2).final_coordinate.is_none());
    assert!(repo.store(3).final_coordinate.is_none());
}

#[tokio::test]
async fn persistence_failure_does_not_abort_batch() {
    let server = MockServer::start().await;
    mount_overpass_empty(&server).await;

    let repo = MemoryRepository::with_stores(vec![
        store(
            21,
            "Denns BioMarkt Hof",
            Some(Coordinate::new(50.3135, 11.9128)),
            "Ludwigstraße 2",
            "95028",
            "Hof",
        ),
        store(
            22,
            "Denns BioMarkt Bayreuth",
            Some(Coordinate::new(49.9456, 11.5713)),
            "Maximilianstraße 5",
            "95444",
            "Bayreuth",
        ),
    ])
    .failing_applies();

    let stats = resolver(&server).geocode_pending(&repo, None).await.unwrap();
    assert_eq!(
        stats,
        BatchStats {
            total: 2,
            successful: 0,
            failed: 2
        }
    );
    assert!(repo.store(21).osm_checked);
    assert!(repo.store(22).osm_checked);
    assert!(repo.store(21).final_coordinate.is_none());
}

#[tokio::test]
async fn limit_caps_batch_and_skips_checked_stores() {
    let server = MockServer::start().await;
    mount_overpass_empty(&server).await;

    let mut done = store(
        30,
        "Denns BioMarkt Alt",
        Some(Coordinate::new(49.45, 11.08)),
        "A 1",
        "90402",
        "Nürnberg",
    );
    done.osm_checked = true;
    let repo = MemoryRepository::with_stores(vec![
        done,
        store(31, "Denns BioMarkt Eins", Some(Coordinate::new(49.46, 11.07)), "B 1", "90403", "Nürnberg"),
        store(32, "Denns BioMarkt Zwei", Some(Coordinate::new(49.47, 11.06)), "C 1", "90404", "Nürnberg"),
    ]);
    let resolver = resolver(&server);

    let first = resolver.geocode_pending(&repo, Some(1)).await.unwrap();
    assert_eq!(first.total, 1);
    assert_eq!(first.successful, 1);
    assert!(repo.store(31).osm_checked);
    assert!(!repo.store(32).osm_checked);

    let rest = resolver.geocode_pending(&repo, None).await.unwrap();
    assert_eq!(rest.total, 1);
    assert!(repo.store(32).osm_checked);
    assert!(repo.store(30).final_coordinate.is_none());

    let empty = resolver.geocode_pending(&repo, None).await.unwrap();
    assert_eq!(empty, BatchStats::default());
}
