use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{chats::ChatManager, check, AppError, AppResult};

use super::{Message, MessageType};

type MessageRow = (String, String, String, String, String, OffsetDateTime);

fn message_from_row((id, chat_id, sender_id, kind, content, created_at): MessageRow) -> AppResult<Message> {
    let kind = kind
        .parse()
        .map_err(|err: String| anyhow::anyhow!("message {id}: {err}"))?;

    Ok(Message {
        id,
        chat_id,
        sender_id,
        kind,
        content,
        created_at,
    })
}

pub struct MessageManager<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MessageManager<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }
}

impl MessageManager<'_> {
    pub async fn add(&self, caller: Option<&str>, kind: &str, chat_id: &str, content: &str) -> AppResult<()> {
        let sender_id = check::logged_in(caller, "User must be logged-in to send a message")?;
        let kind: MessageType = kind
            .parse()
            .map_err(|_| AppError::invalid("type", "must be one of text, picture, location"))?;
        check::non_empty("chatId", chat_id)?;
        check::non_empty("content", content)?;

        if !ChatManager::new(self.pool).exists(chat_id).await? {
            return Err(AppError::ChatNotExists);
        }

        let id = Uuid::now_v7().to_string();
        sqlx::query("INSERT INTO messages (id,chat_id,sender_id,kind,content,created_at) VALUES (?,?,?,?,?,?)")
            .bind(&id)
            .bind(chat_id)
            .bind(sender_id)
            .bind(kind.as_str())
            .bind(content)
            .bind(OffsetDateTime::now_utc())
            .execute(self.pool)
            .await?;

        tracing::debug!(message_id = %id, chat_id, sender_id, %kind, "message added");
        Ok(())
    }

    /// Number of messages across every chat.
    pub async fn count(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Messages of one chat, oldest first. Only its members may read them.
    pub async fn list(&self, caller: Option<&str>, chat_id: &str) -> AppResult<Vec<Message>> {
        let caller = check::logged_in(caller, "User must be logged-in to read messages")?;
        check::non_empty("chatId", chat_id)?;

        let chats = ChatManager::new(self.pool);
        if !chats.exists(chat_id).await? {
            return Err(AppError::ChatNotExists);
        }
        if !chats.is_member(chat_id, caller).await? {
            return Err(AppError::Forbidden("Only chat members can read its messages"));
        }

        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id,chat_id,sender_id,kind,content,created_at FROM messages WHERE chat_id=? ORDER BY created_at, id",
        )
        .bind(chat_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(message_from_row).collect()
    }
}
