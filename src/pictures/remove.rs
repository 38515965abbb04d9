use axum::{debug_handler, extract::{Path, State}, http::StatusCode};

use crate::{AppResult, AppState, Caller};

use super::PictureStore;

#[debug_handler(state = AppState)]
pub(crate) async fn remove_picture(
    State(store): State<PictureStore>,
    caller: Caller,
    Path(picture_id): Path<String>,
) -> AppResult<StatusCode> {
    store.remove(caller.id(), &picture_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
