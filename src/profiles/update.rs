use axum::{debug_handler, extract::State, http::StatusCode};
use sqlx::SqlitePool;

use crate::{AppResult, AppState, Caller, JsonBody};

use super::{Profile, ProfileManager};

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(db_pool): State<SqlitePool>,
    caller: Caller,

    JsonBody(profile): JsonBody<Profile>,
) -> AppResult<StatusCode> {
    ProfileManager::new(&db_pool)
        .update(caller.id(), &profile)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
