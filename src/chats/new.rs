use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{AppResult, AppState, Caller, JsonBody};

use super::ChatManager;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddChatRequest {
    #[serde(default)]
    receiver_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddChatResponse {
    chat_id: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_chat(
    State(db_pool): State<SqlitePool>,
    caller: Caller,

    JsonBody(AddChatRequest { receiver_id }): JsonBody<AddChatRequest>,
) -> AppResult<(StatusCode, Json<AddChatResponse>)> {
    let chat_id = ChatManager::new(&db_pool)
        .create(caller.id(), &receiver_id)
        .await?;

    Ok((StatusCode::CREATED, Json(AddChatResponse { chat_id })))
}
