use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{check, db, AppError, AppResult};

use super::Chat;

type ChatRow = (String, String, String, OffsetDateTime);

fn chat_from_row((id, member_a, member_b, created_at): ChatRow) -> Chat {
    Chat {
        id,
        member_ids: [member_a, member_b],
        created_at,
    }
}

pub struct ChatManager<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChatManager<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }
}

impl ChatManager<'_> {
    /// Opens a chat between `caller` and `receiver_id`, returning its id.
    pub async fn create(&self, caller: Option<&str>, receiver_id: &str) -> AppResult<String> {
        let caller = check::logged_in(caller, "User must be logged-in to create a new chat")?;
        check::non_empty("receiverId", receiver_id)?;

        if receiver_id == caller {
            return Err(AppError::IllegalReceiver);
        }

        if self.find_between(caller, receiver_id).await?.is_some() {
            return Err(AppError::ChatExists);
        }

        let chat_id = self.insert(caller, receiver_id).await?;
        tracing::info!(%chat_id, caller, receiver_id, "chat created");

        Ok(chat_id)
    }

    /// Removes a chat together with all of its messages.
    pub async fn remove(&self, caller: Option<&str>, chat_id: &str) -> AppResult<()> {
        let caller = check::logged_in(caller, "User must be logged-in to remove chat")?;
        check::non_empty("chatId", chat_id)?;

        if !self.exists(chat_id).await? {
            return Err(AppError::ChatNotExists);
        }

        // messages go first so a chat is never removed while its messages remain
        let mut tx = self.pool.begin().await?;
        let messages = sqlx::query("DELETE FROM messages WHERE chat_id=?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM chats WHERE id=?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(chat_id, caller, messages, "chat removed");
        Ok(())
    }

    /// Chats `caller` is a member of, newest first.
    pub async fn list(&self, caller: Option<&str>) -> AppResult<Vec<Chat>> {
        let caller = check::logged_in(caller, "User must be logged-in to list chats")?;

        let rows: Vec<ChatRow> = sqlx::query_as(
            "SELECT id,member_a,member_b,created_at FROM chats WHERE member_a=? OR member_b=? ORDER BY created_at DESC, id DESC",
        )
        .bind(caller)
        .bind(caller)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(chat_from_row).collect())
    }

    pub async fn exists(&self, chat_id: &str) -> AppResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM chats WHERE id=?")
            .bind(chat_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn is_member(&self, chat_id: &str, user_id: &str) -> AppResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM chats WHERE id=?1 AND (member_a=?2 OR member_b=?2)")
            .bind(chat_id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn find_between(&self, a: &str, b: &str) -> AppResult<Option<Chat>> {
        let row: Option<ChatRow> = sqlx::query_as(
            "SELECT id,member_a,member_b,created_at FROM chats WHERE min(member_a,member_b)=min(?1,?2) AND max(member_a,member_b)=max(?1,?2)",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(chat_from_row))
    }

    async fn insert(&self, member_a: &str, member_b: &str) -> AppResult<String> {
        let chat_id = Uuid::now_v7().to_string();

        let inserted = sqlx::query("INSERT INTO chats (id,member_a,member_b,created_at) VALUES (?,?,?,?)")
            .bind(&chat_id)
            .bind(member_a)
            .bind(member_b)
            .bind(OffsetDateTime::now_utc())
            .execute(self.pool)
            .await;

        match inserted {
            Ok(_) => Ok(chat_id),
            // lost a race with a concurrent create for the same pair
            Err(err) if db::is_unique_violation(&err) => Err(AppError::ChatExists),
            Err(err) => Err(err.into()),
        }
    }
}
