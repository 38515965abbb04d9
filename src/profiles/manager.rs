use sqlx::SqlitePool;

use crate::{check, AppResult};

use super::Profile;

pub struct ProfileManager<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileManager<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }
}

impl ProfileManager<'_> {
    /// Replaces the caller's profile. Fields left out are cleared, not kept.
    pub async fn update(&self, caller: Option<&str>, profile: &Profile) -> AppResult<()> {
        let user_id = check::logged_in(caller, "User must be logged-in to update the profile")?;
        check::non_empty("name", &profile.name)?;
        if let Some(picture_id) = &profile.picture_id {
            check::non_empty("pictureId", picture_id)?;
        }

        sqlx::query(
            "INSERT INTO users (id,profile_name,profile_picture_id) VALUES (?,?,?)
             ON CONFLICT(id) DO UPDATE SET profile_name=excluded.profile_name, profile_picture_id=excluded.profile_picture_id",
        )
        .bind(user_id)
        .bind(&profile.name)
        .bind(&profile.picture_id)
        .execute(self.pool)
        .await?;

        tracing::debug!(user_id, "profile updated");
        Ok(())
    }

    pub async fn get(&self, caller: Option<&str>) -> AppResult<Option<Profile>> {
        let user_id = check::logged_in(caller, "User must be logged-in to read the profile")?;

        let row: Option<(Option<String>, Option<String>)> =
            sqlx::query_as("SELECT profile_name,profile_picture_id FROM users WHERE id=?")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.and_then(|(name, picture_id)| Some(Profile { name: name?, picture_id })))
    }
}
