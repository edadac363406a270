use std::sync::Arc;

use advance_api::offers::{AcceptOfferResponse, FinancingResponse, OfferResponse};
use advance_api::{app, AppState};
use advance_core::clock::FixedClock;
use advance_core::{Ad, FinancingProvider, Organization, ProviderId};
use advance_store::app_config::{
    BusinessRules, CatalogConfig, Config, SeedConfig, ServerConfig, StorageBackend, StorageConfig,
};
use advance_store::InMemoryStore;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Months, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

async fn test_app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    for (id, slug, pct) in [(1, "financing_bank", 5), (2, "financing_fintech", 7)] {
        store
            .add_provider(FinancingProvider {
                id: ProviderId(id),
                slug: slug.to_string(),
                payment_method: "transfer".to_string(),
                financing_percentage: pct,
            })
            .await;
    }
    for (id, country, months) in [("org-es", "SPAIN", 24), ("org-young", "ITALY", 3)] {
        store
            .add_organization(Organization {
                id: id.to_string(),
                country: country.to_string(),
                created_date: now().checked_sub_months(Months::new(months)).unwrap(),
            })
            .await;
    }
    for (id, org_id, quantity, price) in [("ad-es", "org-es", 3, 5_000), ("ad-young", "org-young", 100, 10_000)] {
        store
            .add_ad(Ad {
                id: id.to_string(),
                quantity,
                price,
                org_id: org_id.to_string(),
            })
            .await;
    }

    let state = AppState::with_store(
        store,
        &CatalogConfig::default(),
        &BusinessRules::default(),
        Arc::new(FixedClock(now())),
    )
    .await
    .unwrap();

    app(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

async fn create(app: &Router, ad: &str) -> OfferResponse {
    let (status, body) = send(
        app,
        "POST",
        "/offers",
        Some(json!({ "ad": ad, "amount": 2000, "price": 150, "payment_method": "100_in_unload" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    decode(&body)
}

#[tokio::test]
async fn test_offer_financing_flow() {
    let app = test_app().await;

    let offer = create(&app, "ad-es").await;
    assert_eq!(offer.financing_provider, Some(ProviderId(1)));
    assert!(!offer.accepted);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/offers/{}/financing", offer.id),
        Some(json!({ "financingPartner": "financing_fintech", "totalToPerceive": 10000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/offers/{}/financing", offer.id),
        Some(json!({ "financingPartner": "financing_bank", "totalToPerceive": 10000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let financing: FinancingResponse = decode(&body);
    assert_eq!(financing.net_amount, 9_500);
    assert_eq!(financing.fee, 500);
}

#[tokio::test]
async fn test_accept_with_override_and_pending_listing() {
    let app = test_app().await;
    let first = create(&app, "ad-es").await;
    let second = create(&app, "ad-es").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/offers/{}/accept", first.id),
        Some(json!({ "financingPartner": "financing_fintech" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let accepted: AcceptOfferResponse = decode(&body);
    assert_eq!(accepted.message, "offer accepted");
    assert!(accepted.offer.accepted);
    assert_eq!(accepted.offer.financing_provider, Some(ProviderId(2)));

    let (status, body) = send(&app, "GET", "/orgs/org-es/offers/pending", None).await;
    assert_eq!(status, StatusCode::OK);
    let pending: Vec<OfferResponse> = decode(&body);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);

    // Re-acceptance is refused
    let (status, _) = send(&app, "POST", &format!("/offers/{}/accept", first.id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_accept_without_body() {
    let app = test_app().await;
    let offer = create(&app, "ad-young").await;
    assert_eq!(offer.financing_provider, None);

    let (status, body) = send(&app, "POST", &format!("/offers/{}/accept", offer.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let accepted: AcceptOfferResponse = decode(&body);
    assert!(accepted.offer.accepted);
    assert_eq!(accepted.offer.financing_provider, None);

    let (status, body) = send(&app, "GET", &format!("/offers/{}", offer.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: OfferResponse = decode(&body);
    assert_eq!(fetched.revision, 1);
}

#[tokio::test]
async fn test_error_statuses() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/offers",
        Some(json!({ "ad": "ad-missing", "amount": 1, "price": 1, "payment_method": "card" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = decode(&body);
    assert_eq!(error["error"], "Ad not found: ad-missing");

    let (status, _) = send(&app, "POST", "/offers", Some(json!({ "ad": "ad-es" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/offers/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let offer = create(&app, "ad-es").await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/offers/{}/financing", offer.id),
        Some(json!({ "financingPartner": "financing_unknown", "totalToPerceive": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/offers/{}/accept", offer.id),
        Some(json!({ "financingPartner": "financing_bank", "extra": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_providers_and_health() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/providers", None).await;
    assert_eq!(status, StatusCode::OK);
    let providers: Vec<FinancingProvider> = decode(&body);
    let slugs: Vec<_> = providers.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["financing_bank", "financing_fintech"]);

    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_memory_backend_from_seeded_config() {
    let config = Config {
        server: ServerConfig { port: 0 },
        storage: StorageConfig { backend: StorageBackend::Memory },
        database: None,
        catalog: CatalogConfig::default(),
        business_rules: BusinessRules::default(),
        seed: SeedConfig {
            providers: vec![
                FinancingProvider {
                    id: ProviderId(1),
                    slug: "financing_bank".to_string(),
                    payment_method: "bank_transfer".to_string(),
                    financing_percentage: 5,
                },
                FinancingProvider {
                    id: ProviderId(2),
                    slug: "financing_fintech".to_string(),
                    payment_method: "instant_transfer".to_string(),
                    financing_percentage: 7,
                },
            ],
            organizations: vec![Organization {
                id: "org-seed".to_string(),
                country: "FRANCE".to_string(),
                created_date: Utc.with_ymd_and_hms(2020, 1, 15, 0, 0, 0).unwrap(),
            }],
            ads: vec![Ad {
                id: "ad-seed".to_string(),
                quantity: 3,
                price: 5_000,
                org_id: "org-seed".to_string(),
            }],
        },
    };
    let app = app(AppState::from_config(&config).await.unwrap());

    let offer = create(&app, "ad-seed").await;
    assert_eq!(offer.financing_provider, Some(ProviderId(1)));

    let (status, body) = send(&app, "GET", "/orgs/org-seed/offers/pending", None).await;
    assert_eq!(status, StatusCode::OK);
    let pending: Vec<OfferResponse> = decode(&body);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, offer.id);
}
