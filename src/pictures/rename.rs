use axum::{debug_handler, extract::{Path, State}, http::StatusCode};
use serde::Deserialize;

use crate::{AppResult, AppState, Caller, JsonBody};

use super::PictureStore;

#[derive(Deserialize)]
pub(crate) struct RenamePictureRequest {
    #[serde(default)]
    name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn rename_picture(
    State(store): State<PictureStore>,
    caller: Caller,
    Path(picture_id): Path<String>,

    JsonBody(RenamePictureRequest { name }): JsonBody<RenamePictureRequest>,
) -> AppResult<StatusCode> {
    store.rename(caller.id(), &picture_id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
