mod add;
mod count;
mod list;
mod manager;

use std::{fmt, str::FromStr};

use axum::{routing::{get, post}, Router};
use serde::Serialize;
use time::OffsetDateTime;

use crate::AppState;

pub(crate) use list::list_messages;
pub use manager::MessageManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Picture,
    Location,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        use MessageType::*;
        match self {
            Text => "text",
            Picture => "picture",
            Location => "location",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageType::Text),
            "picture" => Ok(MessageType::Picture),
            "location" => Ok(MessageType::Location),
            other => Err(format!("unknown message type {other:?}")),
        }
    }
}

/// An immutable entry in a chat. For pictures, `content` is the picture url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add::add_message))
        .route("/count", get(count::count_messages))
}
