use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use nestwell_core::{models::*, Database};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::identity::AdminIdentity;

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/screenings", get(list_screenings).post(create_screening))
        .route("/screenings/{id}", get(get_screening))
        .route("/screenings/{id}/review", post(review_screening))
}

async fn list_screenings(
    State(db): State<Database>,
    Query(filter): Query<ScreeningFilter>,
) -> ApiResult<Json<Vec<MedicalScreening>>> {
    Ok(Json(db.list_screenings(&filter)?))
}

async fn create_screening(
    State(db): State<Database>,
    Json(input): Json<CreateScreeningInput>,
) -> ApiResult<(StatusCode, Json<MedicalScreening>)> {
    let screening = db.create_screening(input)?;
    Ok((StatusCode::CREATED, Json(screening)))
}

async fn get_screening(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MedicalScreening>> {
    db.get_screening(id)?
        .map(Json)
        .ok_or(ApiError::NotFound("screening"))
}

async fn review_screening(
    State(db): State<Database>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<Uuid>,
    Json(input): Json<ReviewScreeningInput>,
) -> ApiResult<Json<MedicalScreening>> {
    db.review_screening(id, input, admin)?
        .map(Json)
        .ok_or(ApiError::NotFound("screening"))
}
