use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use nestwell_core::{models::*, Database};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/matches", get(list_matches).post(create_match))
        .route(
            "/matches/{id}",
            get(get_match).put(update_match).delete(delete_match),
        )
}

async fn list_matches(
    State(db): State<Database>,
    Query(filter): Query<MatchFilter>,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(db.list_matches(&filter)?))
}

async fn create_match(
    State(db): State<Database>,
    Json(input): Json<CreateMatchInput>,
) -> ApiResult<(StatusCode, Json<Match>)> {
    let m = db.create_match(input)?;
    Ok((StatusCode::CREATED, Json(m)))
}

async fn get_match(State(db): State<Database>, Path(id): Path<Uuid>) -> ApiResult<Json<Match>> {
    db.get_match(id)?.map(Json).ok_or(ApiError::NotFound("match"))
}

async fn update_match(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateMatchInput>,
) -> ApiResult<Json<Match>> {
    db.update_match(id, input)?
        .map(Json)
        .ok_or(ApiError::NotFound("match"))
}

async fn delete_match(State(db): State<Database>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if db.delete_match(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("match"))
    }
}
