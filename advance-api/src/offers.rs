use advance_core::{Offer, OfferStatus, ProviderId};
use advance_offer::NewOffer;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    /// Ad the advance is requested against
    pub ad: String,
    pub amount: i64,
    pub price: i64,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingRequest {
    pub financing_partner: String,
    pub total_to_perceive: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AcceptOfferRequest {
    #[serde(default)]
    pub financing_partner: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfferResponse {
    pub id: String,
    pub ad_id: String,
    pub payment_method: String,
    pub financing_provider: Option<ProviderId>,
    pub amount: i64,
    pub price: i64,
    pub status: OfferStatus,
    pub accepted: bool,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Offer> for OfferResponse {
    fn from(offer: Offer) -> Self {
        Self {
            accepted: offer.status == OfferStatus::Accepted,
            id: offer.id,
            ad_id: offer.ad_id,
            payment_method: offer.payment_method,
            financing_provider: offer.financing_provider,
            amount: offer.amount,
            price: offer.price,
            status: offer.status,
            revision: offer.revision,
            created_at: offer.created_at,
            updated_at: offer.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinancingResponse {
    pub partner: String,
    pub gross_amount: i64,
    pub fee: i64,
    pub net_amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptOfferResponse {
    pub message: String,
    pub offer: OfferResponse,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /offers
pub async fn create_offer(
    State(state): State<AppState>,
    payload: Result<Json<CreateOfferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OfferResponse>), AppError> {
    let Json(req) = payload?;

    let offer = state
        .lifecycle
        .create_offer(NewOffer {
            ad_id: req.ad,
            amount: req.amount,
            price: req.price,
            payment_method: req.payment_method,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(offer.into())))
}

/// GET /offers/{offer_id}
pub async fn get_offer(
    State(state): State<AppState>,
    Path(offer_id): Path<String>,
) -> Result<Json<OfferResponse>, AppError> {
    let offer = state.lifecycle.get_offer(&offer_id).await?;
    Ok(Json(offer.into()))
}

/// GET /orgs/{org_id}/offers/pending
pub async fn list_pending_offers(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<OfferResponse>>, AppError> {
    let offers = state.lifecycle.list_pending_by_organization(&org_id).await?;
    Ok(Json(offers.into_iter().map(OfferResponse::from).collect()))
}

/// POST /offers/{offer_id}/financing
pub async fn request_financing(
    State(state): State<AppState>,
    Path(offer_id): Path<String>,
    payload: Result<Json<FinancingRequest>, JsonRejection>,
) -> Result<Json<FinancingResponse>, AppError> {
    let Json(req) = payload?;

    let payout = state
        .lifecycle
        .request_financing(&offer_id, &req.financing_partner, req.total_to_perceive)
        .await?;

    Ok(Json(FinancingResponse {
        partner: req.financing_partner,
        gross_amount: payout.gross,
        fee: payout.fee,
        net_amount: payout.net,
    }))
}

/// POST /offers/{offer_id}/accept
///
/// The body is optional; an empty one accepts with the assigned provider.
pub async fn accept_offer(
    State(state): State<AppState>,
    Path(offer_id): Path<String>,
    body: Bytes,
) -> Result<Json<AcceptOfferResponse>, AppError> {
    let req: AcceptOfferRequest = if body.iter().all(u8::is_ascii_whitespace) {
        AcceptOfferRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ValidationError(format!("Invalid JSON format: {}", e)))?
    };

    let offer = state
        .lifecycle
        .accept_offer(&offer_id, req.financing_partner.as_deref())
        .await?;

    Ok(Json(AcceptOfferResponse {
        message: "offer accepted".to_string(),
        offer: offer.into(),
    }))
}
