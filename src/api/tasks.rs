use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use nestwell_core::{models::*, Database};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/overdue", get(list_overdue))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}

async fn list_tasks(
    State(db): State<Database>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(db.list_tasks(&filter)?))
}

async fn list_overdue(State(db): State<Database>) -> ApiResult<Json<Vec<OverdueTask>>> {
    Ok(Json(db.list_overdue_with_assignees(Utc::now())?))
}

async fn create_task(
    State(db): State<Database>,
    Json(input): Json<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = db.create_task(input)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(State(db): State<Database>, Path(id): Path<Uuid>) -> ApiResult<Json<Task>> {
    db.get_task(id)?.map(Json).ok_or(ApiError::NotFound("task"))
}

async fn update_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaskInput>,
) -> ApiResult<Json<Task>> {
    db.update_task(id, input)?
        .map(Json)
        .ok_or(ApiError::NotFound("task"))
}

async fn delete_task(State(db): State<Database>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if db.delete_task(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("task"))
    }
}
