mod compress;
mod filter;
mod permissions;
mod remove;
mod rename;
mod serve;
mod store;
mod upload;

use std::str::FromStr;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use time::OffsetDateTime;

use crate::AppState;

pub use permissions::{StorePermissions, WritePolicy};
pub use store::PictureStore;

/// Room left in the request body for multipart boundaries and headers.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureStatus {
    Uploading,
    Complete,
    Failed,
}

impl PictureStatus {
    pub fn as_str(&self) -> &'static str {
        use PictureStatus::*;
        match self {
            Uploading => "uploading",
            Complete => "complete",
            Failed => "failed",
        }
    }
}

impl FromStr for PictureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploading" => Ok(PictureStatus::Uploading),
            "complete" => Ok(PictureStatus::Complete),
            "failed" => Ok(PictureStatus::Failed),
            other => Err(format!("unknown picture status {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub size: i64,
    pub status: PictureStatus,
    pub owner_id: Option<String>,
    pub created_at: OffsetDateTime,
    pub completed_at: Option<OffsetDateTime>,
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(upload::upload_picture))
        .route(
            "/{picture_id}",
            get(serve::picture)
                .patch(rename::rename_picture)
                .delete(remove::remove_picture),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(MULTIPART_OVERHEAD)))
}
