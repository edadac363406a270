use advance_catalog::CatalogError;
use advance_core::StoreError;
use advance_offer::OfferError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<OfferError> for AppError {
    fn from(err: OfferError) -> Self {
        let msg = err.to_string();
        match err {
            OfferError::AdNotFound(_)
            | OfferError::OrganizationNotFound(_)
            | OfferError::OfferNotFound(_)
            | OfferError::PartnerNotFound(_) => AppError::NotFoundError(msg),
            OfferError::PartnerMismatch { .. }
            | OfferError::AlreadyAccepted(_)
            | OfferError::Store(StoreError::Conflict { .. }) => AppError::ConflictError(msg),
            OfferError::InvalidRequest(_) => AppError::ValidationError(msg),
            OfferError::Catalog(_) | OfferError::Store(_) => AppError::InternalServerError(msg),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
