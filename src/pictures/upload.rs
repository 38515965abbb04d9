use axum::{debug_handler, extract::{Multipart, State}, http::StatusCode, Json};
use serde::Serialize;

use crate::{AppError, AppResult, AppState, Caller};

use super::PictureStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadedPicture {
    picture_id: String,
    /// Usable as the content of a `picture` message.
    url: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn upload_picture(
    State(store): State<PictureStore>,
    caller: Caller,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadedPicture>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().unwrap_or_default().to_owned();

        let picture = store.upload(caller.id(), &name, &content_type, field).await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadedPicture {
                url: PictureStore::url(&picture.id),
                picture_id: picture.id,
            }),
        ));
    }

    Err(AppError::invalid("file", "expected a multipart field named file"))
}
