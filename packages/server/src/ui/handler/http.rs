//! Request/response endpoint handlers.

use std::{fmt::Write, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    domain::{MessageBody, Nickname, RoomId, RoomTitle},
    infrastructure::dto::http::{CreateRoomRequest, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
};

use super::error::HandlerError;

/// Query parameters for posting a message
#[derive(Debug, Deserialize)]
pub struct SayQuery {
    #[serde(rename = "roomID")]
    pub room_id: String,
    pub nickname: String,
    pub msg: String,
}

/// Query parameters for leaving a room
#[derive(Debug, Deserialize)]
pub struct LeaveQuery {
    #[serde(rename = "roomID")]
    pub room_id: String,
    pub nickname: String,
}

/// Query parameters for the chat list
#[derive(Debug, Deserialize)]
pub struct ChatListQuery {
    pub nickname: String,
}

/// Post a message to a room (`/chat/say`)
pub async fn say(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SayQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let room_id = RoomId::try_from(query.room_id)?;
    let author = Nickname::try_from(query.nickname)?;
    let body = MessageBody::try_from(query.msg)?;

    tracing::debug!("'{}' says in room '{}'", author, room_id);
    state
        .send_message_usecase
        .execute(&room_id, author, body)
        .await?;

    Ok((StatusCode::ACCEPTED, "ok\n"))
}

/// Remove a nickname from a room (`/chat/leave`)
pub async fn leave(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaveQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let room_id = RoomId::try_from(query.room_id)?;
    let nickname = Nickname::try_from(query.nickname)?;

    state
        .leave_room_usecase
        .execute(&room_id, nickname)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Register the nickname on first visit and list rooms (`/chatlist`)
pub async fn chat_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChatListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let nickname = Nickname::try_from(query.nickname)?;
    let list = state.visit_chat_list_usecase.execute(nickname).await;

    let mut text = format!("ID: {}\n", list.user.nickname);
    if let Some(room_id) = &list.user.current_room {
        let _ = writeln!(text, "Current room: {}", room_id);
    }
    text.push_str("\nChannel List Below\n");
    for (room_id, title) in &list.rooms {
        let _ = write!(text, "\n{} - {}", room_id, title);
    }
    text.push('\n');

    Ok(text)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, HandlerError> {
    let room_id = RoomId::try_from(room_id)?;
    let snapshot = state.get_room_detail_usecase.execute(&room_id).await?;
    Ok(Json(RoomDetailDto::from(&snapshot)))
}

/// Create a room while the server is running
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    request: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(request) = request?;
    let room_id = RoomId::try_from(request.id)?;
    let title = RoomTitle::new(request.title)?;

    let room = state.create_room_usecase.execute(room_id, title).await?;
    let snapshot = room.snapshot(0).await?;

    Ok((StatusCode::CREATED, Json(RoomSummaryDto::from(&snapshot))))
}
