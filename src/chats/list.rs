use axum::{debug_handler, extract::State, Json};
use sqlx::SqlitePool;

use crate::{AppResult, AppState, Caller};

use super::{Chat, ChatManager};

#[debug_handler(state = AppState)]
pub(crate) async fn list_chats(
    State(db_pool): State<SqlitePool>,
    caller: Caller,
) -> AppResult<Json<Vec<Chat>>> {
    Ok(Json(ChatManager::new(&db_pool).list(caller.id()).await?))
}
