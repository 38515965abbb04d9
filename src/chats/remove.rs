use axum::{debug_handler, extract::{Path, State}, http::StatusCode};
use sqlx::SqlitePool;

use crate::{AppResult, AppState, Caller};

use super::ChatManager;

#[debug_handler(state = AppState)]
pub(crate) async fn remove_chat(
    State(db_pool): State<SqlitePool>,
    caller: Caller,
    Path(chat_id): Path<String>,
) -> AppResult<StatusCode> {
    ChatManager::new(&db_pool)
        .remove(caller.id(), &chat_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
