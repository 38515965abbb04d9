use axum::{debug_handler, extract::State, Json};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::AppResult;

#[derive(Serialize)]
pub(crate) struct MessageCount {
    count: i64,
}

#[debug_handler]
pub(crate) async fn count_messages(State(db_pool): State<SqlitePool>) -> AppResult<Json<MessageCount>> {
    let count = super::MessageManager::new(&db_pool).count().await?;
    Ok(Json(MessageCount { count }))
}
