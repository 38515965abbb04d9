use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;

use crate::{AppResult, AppState, Caller};

use super::{Message, MessageManager};

#[debug_handler(state = AppState)]
pub(crate) async fn list_messages(
    State(db_pool): State<SqlitePool>,
    caller: Caller,
    Path(chat_id): Path<String>,
) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(MessageManager::new(&db_pool).list(caller.id(), &chat_id).await?))
}
