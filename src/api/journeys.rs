use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use nestwell_core::{models::*, Database, StageTimeline};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::identity::AdminIdentity;
use super::types::{JourneyDetail, StageListResponse};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/journeys", get(list_journeys).post(create_journey))
        .route("/journeys/{id}", get(get_journey).delete(delete_journey))
        .route("/journeys/{id}/timeline", get(get_timeline))
        .route("/journeys/{id}/history", get(get_history))
        .route("/journeys/{id}/advance", post(advance_journey))
        .route("/stages/{track}", get(list_stages))
}

fn detail(db: &Database, journey: Journey) -> ApiResult<JourneyDetail> {
    let ip = db.get_participant(journey.intended_parent_id)?;
    let gc = db.get_participant(journey.surrogate_id)?;
    Ok(JourneyDetail::new(journey, ip.as_ref(), gc.as_ref()))
}

async fn list_journeys(
    State(db): State<Database>,
    Query(filter): Query<JourneyFilter>,
) -> ApiResult<Json<Vec<Journey>>> {
    Ok(Json(db.list_journeys(&filter)?))
}

async fn create_journey(
    State(db): State<Database>,
    Json(input): Json<CreateJourneyInput>,
) -> ApiResult<(StatusCode, Json<JourneyDetail>)> {
    let journey = db.create_journey(input)?;
    Ok((StatusCode::CREATED, Json(detail(&db, journey)?)))
}

async fn get_journey(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JourneyDetail>> {
    let journey = db.get_journey(id)?.ok_or(ApiError::NotFound("journey"))?;
    Ok(Json(detail(&db, journey)?))
}

async fn delete_journey(State(db): State<Database>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if db.delete_journey(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("journey"))
    }
}

async fn get_timeline(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StageTimeline>> {
    db.get_journey_timeline(id)?
        .map(Json)
        .ok_or(ApiError::NotFound("journey"))
}

async fn get_history(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<StageHistoryEntry>>> {
    let journey = db.get_journey(id)?.ok_or(ApiError::NotFound("journey"))?;
    Ok(Json(journey.stage_history))
}

async fn advance_journey(
    State(db): State<Database>,
    AdminIdentity(admin): AdminIdentity,
    Path(id): Path<Uuid>,
    Json(input): Json<AdvanceJourneyInput>,
) -> ApiResult<Json<JourneyDetail>> {
    let journey = db.advance_journey(id, &input, admin)?;
    Ok(Json(detail(&db, journey)?))
}

async fn list_stages(Path(track): Path<String>) -> ApiResult<Json<StageListResponse>> {
    let track = JourneyTrack::from_str(&track).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown track '{}', expected case or milestone", track))
    })?;
    Ok(Json(StageListResponse::for_track(track)))
}
