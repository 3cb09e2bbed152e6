use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use nestwell_core::{models::*, Database};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::types::ParticipantView;

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/participants", get(list_participants).post(create_participant))
        .route(
            "/participants/{id}",
            get(get_participant)
                .put(update_participant)
                .delete(delete_participant),
        )
}

async fn list_participants(
    State(db): State<Database>,
    Query(filter): Query<ParticipantFilter>,
) -> ApiResult<Json<Vec<ParticipantView>>> {
    let participants = db.list_participants(&filter)?;
    Ok(Json(participants.into_iter().map(ParticipantView::from).collect()))
}

async fn create_participant(
    State(db): State<Database>,
    Json(input): Json<CreateParticipantInput>,
) -> ApiResult<(StatusCode, Json<ParticipantView>)> {
    if input.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email must not be empty".into()));
    }
    let participant = db.create_participant(input)?;
    Ok((StatusCode::CREATED, Json(participant.into())))
}

async fn get_participant(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ParticipantView>> {
    db.get_participant(id)?
        .map(|p| Json(p.into()))
        .ok_or(ApiError::NotFound("participant"))
}

async fn update_participant(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateParticipantInput>,
) -> ApiResult<Json<ParticipantView>> {
    if !db.update_participant(id, input)? {
        return Err(ApiError::NotFound("participant"));
    }
    db.get_participant(id)?
        .map(|p| Json(p.into()))
        .ok_or(ApiError::NotFound("participant"))
}

async fn delete_participant(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if db.delete_participant(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("participant"))
    }
}
