use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use medassist_core::{ManualClock, StrategyLookup};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{ApiClient, StrategyClient};

fn lookup_body() -> serde_json::Value {
    serde_json::json!({
        "strategy": {
            "medication_id": "tacrolimus",
            "generic_name": "Tacrolimus",
            "brand_name": "Prograf",
            "category": null,
            "condition": null,
            "retail_price_low": 20000,
            "retail_price_high": 60000,
            "retail_price_note": null,
            "common_mistakes": [],
            "savingsOptions": []
        },
        "pharmacies": {
            "costco": {"available": true, "priceCents": 3500, "priceNote": null, "url": null}
        }
    })
}

fn client(server: &MockServer) -> (StrategyClient, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap()));
    let api = ApiClient::new(&server.uri()).unwrap();
    (StrategyClient::with_clock(api, clock.clone()), clock)
}

#[tokio::test]
async fn test_lookup_cached_for_five_minutes() {
    let server = MockServer::start().await;
    let (client, clock) = client(&server);

    Mock::given(method("GET"))
        .and(path("/medication-strategy"))
        .and(query_param("medicationId", "tacrolimus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body()))
        .expect(2)
        .mount(&server)
        .await;

    let first = client.fetch_medication_strategy("tacrolimus").await;
    assert_eq!(first.strategy.as_ref().unwrap().medication_id, "tacrolimus");

    clock.advance(Duration::seconds(299));
    assert_eq!(client.fetch_medication_strategy("tacrolimus").await, first);

    clock.advance(Duration::seconds(1));
    assert_eq!(client.fetch_medication_strategy("tacrolimus").await, first);
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let server = MockServer::start().await;
    let (client, _) = client(&server);

    Mock::given(method("GET"))
        .and(path("/medication-strategy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body()))
        .expect(2)
        .mount(&server)
        .await;

    client.fetch_medication_strategy("tacrolimus").await;
    client.clear_cache();
    client.fetch_medication_strategy("tacrolimus").await;
}

#[tokio::test]
async fn test_failure_is_empty_and_not_cached() {
    let server = MockServer::start().await;
    let (client, _) = client(&server);

    Mock::given(method("GET"))
        .and(path("/medication-strategy"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Internal server error"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/medication-strategy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body()))
        .mount(&server)
        .await;

    assert_eq!(client.fetch_medication_strategy("tacrolimus").await, StrategyLookup::empty());
    assert!(client.fetch_medication_strategy("tacrolimus").await.strategy.is_some());
}

#[tokio::test]
async fn test_unreachable_server_yields_empty_shapes() {
    let api = ApiClient::new("http://127.0.0.1:9").unwrap();
    let client = StrategyClient::new(api);
    assert_eq!(client.fetch_medication_strategy("tacrolimus").await, StrategyLookup::empty());
    let catalog = client.fetch_all_medication_strategies().await;
    assert!(catalog.strategies.is_empty());
    assert!(catalog.pharmacy_availability.is_empty());
}

#[tokio::test]
async fn test_check_pharmacy_availability() {
    let server = MockServer::start().await;
    let (client, _) = client(&server);

    Mock::given(method("GET"))
        .and(path("/medication-strategy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body()))
        .expect(1)
        .mount(&server)
        .await;

    let costco = client.check_pharmacy_availability("tacrolimus", "costco").await.unwrap();
    assert!(costco.available);
    assert_eq!(costco.price_cents, Some(3500));
    assert!(client.check_pharmacy_availability("tacrolimus", "walgreens").await.is_none());
}

#[tokio::test]
async fn test_fetch_all_strategies() {
    let server = MockServer::start().await;
    let (client, _) = client(&server);

    Mock::given(method("GET"))
        .and(path("/medication-strategy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "strategies": [{
                "medication_id": "tacrolimus", "generic_name": "Tacrolimus",
                "brand_name": "Prograf", "category": null, "condition": null,
                "retail_price_low": null, "retail_price_high": null
            }],
            "pharmacyAvailability": {"tacrolimus": {"costco": true}}
        })))
        .mount(&server)
        .await;

    let catalog = client.fetch_all_medication_strategies().await;
    assert_eq!(catalog.strategies.len(), 1);
    assert!(catalog.pharmacy_availability["tacrolimus"]["costco"]);
}
