mod list;
mod manager;
mod new;
mod remove;

use axum::{routing::{delete, get}, Router};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{messages, AppState};

pub use manager::ChatManager;

/// A two-member conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub member_ids: [String; 2],
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_chats).post(new::add_chat))
        .route("/{chat_id}", delete(remove::remove_chat))
        .route("/{chat_id}/messages", get(messages::list_messages))
}
