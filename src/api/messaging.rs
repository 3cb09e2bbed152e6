use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use nestwell_core::{models::*, Database};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::types::{ConversationQuery, MarkReadRequest, MarkReadResponse};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/conversations", get(list_conversations).post(create_conversation))
        .route("/conversations/{id}", get(get_conversation))
        .route(
            "/conversations/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/conversations/{id}/read", post(mark_read))
}

async fn list_conversations(
    State(db): State<Database>,
    Query(query): Query<ConversationQuery>,
) -> ApiResult<Json<Vec<ConversationOverview>>> {
    Ok(Json(db.list_conversations_for(query.participant_id)?))
}

async fn create_conversation(
    State(db): State<Database>,
    Json(input): Json<CreateConversationInput>,
) -> ApiResult<(StatusCode, Json<Conversation>)> {
    let conversation = db.create_conversation(input)?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

async fn get_conversation(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Conversation>> {
    db.get_conversation(id)?
        .map(Json)
        .ok_or(ApiError::NotFound("conversation"))
}

async fn list_messages(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Message>>> {
    if db.get_conversation(id)?.is_none() {
        return Err(ApiError::NotFound("conversation"));
    }
    Ok(Json(db.list_messages(id)?))
}

async fn send_message(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<SendMessageInput>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let message = db
        .send_message(id, input)?
        .ok_or(ApiError::NotFound("conversation"))?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn mark_read(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(request): Json<MarkReadRequest>,
) -> ApiResult<Json<MarkReadResponse>> {
    let marked = db
        .mark_conversation_read(id, request.reader_id)?
        .ok_or(ApiError::NotFound("conversation"))?;
    Ok(Json(MarkReadResponse { marked }))
}
