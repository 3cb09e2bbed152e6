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
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route(
            "/appointments/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
}

async fn list_appointments(
    State(db): State<Database>,
    Query(filter): Query<AppointmentFilter>,
) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(db.list_appointments(&filter)?))
}

async fn create_appointment(
    State(db): State<Database>,
    Json(input): Json<CreateAppointmentInput>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let appointment = db.create_appointment(input)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn get_appointment(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Appointment>> {
    db.get_appointment(id)?
        .map(Json)
        .ok_or(ApiError::NotFound("appointment"))
}

async fn update_appointment(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAppointmentInput>,
) -> ApiResult<Json<Appointment>> {
    db.update_appointment(id, input)?
        .map(Json)
        .ok_or(ApiError::NotFound("appointment"))
}

async fn delete_appointment(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if db.delete_appointment(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("appointment"))
    }
}
