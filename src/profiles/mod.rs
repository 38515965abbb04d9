mod manager;
mod page;
mod update;

use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

pub use manager::ProfileManager;

/// Display data embedded in a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::profile).put(update::update_profile))
}
