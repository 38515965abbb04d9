use axum::{debug_handler, extract::State, Json};
use sqlx::SqlitePool;

use crate::{AppResult, AppState, Caller};

use super::{Profile, ProfileManager};

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    State(db_pool): State<SqlitePool>,
    caller: Caller,
) -> AppResult<Json<Option<Profile>>> {
    Ok(Json(ProfileManager::new(&db_pool).get(caller.id()).await?))
}
