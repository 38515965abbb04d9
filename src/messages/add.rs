use axum::{debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{AppResult, AppState, Caller, JsonBody};

use super::MessageManager;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddMessageRequest {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    chat_id: String,
    #[serde(default)]
    content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn add_message(
    State(db_pool): State<SqlitePool>,
    caller: Caller,

    JsonBody(AddMessageRequest { kind, chat_id, content }): JsonBody<AddMessageRequest>,
) -> AppResult<StatusCode> {
    MessageManager::new(&db_pool)
        .add(caller.id(), &kind, &chat_id, &content)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
