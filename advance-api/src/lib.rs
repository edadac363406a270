use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod offers;
pub mod providers;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route("/health", get(health))
        .route("/providers", get(providers::list_providers))
        .route("/offers", post(offers::create_offer))
        .route("/offers/{offer_id}", get(offers::get_offer))
        .route("/offers/{offer_id}/financing", post(offers::request_financing))
        .route("/offers/{offer_id}/accept", post(offers::accept_offer))
        .route("/orgs/{org_id}/offers/pending", get(offers::list_pending_offers))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
