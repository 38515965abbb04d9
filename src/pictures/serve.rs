use axum::{
    body::Body,
    debug_handler,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tokio_util::io::ReaderStream;

use crate::{AppResult, AppState};

use super::PictureStore;

#[debug_handler(state = AppState)]
pub(crate) async fn picture(
    State(store): State<PictureStore>,
    Path(picture_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (picture, file) = store.open_file(&picture_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, picture.content_type),
            (header::CONTENT_LENGTH, picture.size.to_string()),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_owned()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}
