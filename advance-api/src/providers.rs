use advance_core::FinancingProvider;
use axum::{extract::State, Json};

use crate::error::AppError;
use crate::state::AppState;

/// GET /providers
pub async fn list_providers(
    State(state): State<AppState>,
) -> Result<Json<Vec<FinancingProvider>>, AppError> {
    let providers = state.catalog.list().await?;
    Ok(Json(providers))
}
