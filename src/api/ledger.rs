use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use nestwell_core::{models::*, Database};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::identity::AdminIdentity;
use super::types::LedgerSummaryQuery;

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/ledger", get(list_entries).post(create_entry))
        .route("/ledger/summary", get(summary))
        .route("/ledger/{id}", delete(delete_entry))
}

async fn list_entries(
    State(db): State<Database>,
    Query(filter): Query<LedgerFilter>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    Ok(Json(db.list_ledger_entries(&filter)?))
}

async fn create_entry(
    State(db): State<Database>,
    AdminIdentity(admin): AdminIdentity,
    Json(input): Json<CreateLedgerEntryInput>,
) -> ApiResult<(StatusCode, Json<LedgerEntry>)> {
    let entry = db.create_ledger_entry(input, admin)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn summary(
    State(db): State<Database>,
    Query(query): Query<LedgerSummaryQuery>,
) -> ApiResult<Json<LedgerSummary>> {
    Ok(Json(db.ledger_summary(query.journey_id)?))
}

async fn delete_entry(State(db): State<Database>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if db.delete_ledger_entry(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("ledger entry"))
    }
}
