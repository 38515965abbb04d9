use std::path::PathBuf;

use axum::body::Bytes;
use futures_util::{Stream, TryStreamExt};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tokio::{fs::File, io::AsyncWriteExt};
use uuid::Uuid;

use crate::{check, AppError, AppResult, Config};

use super::{compress, filter, Picture, PictureStatus, StorePermissions};

type PictureRow = (String, String, String, i64, String, Option<String>, OffsetDateTime, Option<OffsetDateTime>);

fn picture_from_row(row: PictureRow) -> AppResult<Picture> {
    let (id, name, content_type, size, status, owner_id, created_at, completed_at) = row;
    let status = status
        .parse()
        .map_err(|err: String| anyhow::anyhow!("picture {id}: {err}"))?;

    Ok(Picture {
        id,
        name,
        content_type,
        size,
        status,
        owner_id,
        created_at,
        completed_at,
    })
}

/// Picture metadata lives in the `pictures` table, the recompressed bytes in
/// `dir`, one file per picture id.
#[derive(Debug, Clone)]
pub struct PictureStore {
    pool: SqlitePool,
    dir: PathBuf,
    quality: u8,
    max_upload_bytes: usize,
    permissions: StorePermissions,
}

impl PictureStore {
    pub fn new(pool: SqlitePool, dir: impl Into<PathBuf>, quality: u8, max_upload_bytes: usize, permissions: StorePermissions) -> Self {
        Self {
            pool,
            dir: dir.into(),
            quality,
            max_upload_bytes,
            permissions,
        }
    }

    pub async fn open(pool: SqlitePool, config: &Config) -> AppResult<Self> {
        tokio::fs::create_dir_all(&config.picture_dir).await?;
        tracing::info!(dir = %config.picture_dir.display(), policy = %config.picture_write_policy, "picture store ready");

        Ok(Self::new(
            pool,
            &config.picture_dir,
            config.picture_quality,
            config.max_upload_bytes,
            StorePermissions::uniform(config.picture_write_policy),
        ))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn url(picture_id: &str) -> String {
        format!("/pictures/{picture_id}")
    }

    /// Streams `body` to disk, recompresses it and records the result.
    pub async fn upload<S, E>(&self, caller: Option<&str>, name: &str, content_type: &str, body: S) -> AppResult<Picture>
    where
        S: Stream<Item = Result<Bytes, E>>,
        AppError: From<E>,
    {
        if !filter::accepts(content_type) {
            return Err(AppError::InvalidContentType(content_type.to_owned()));
        }
        if !self.permissions.insert.allows(caller, caller) {
            return Err(AppError::Forbidden("Not allowed to upload pictures"));
        }

        let id = Uuid::now_v7().to_string();
        let name = if name.is_empty() { "picture" } else { name };

        sqlx::query("INSERT INTO pictures (id,name,content_type,size,status,owner_id,created_at) VALUES (?,?,?,0,?,?,?)")
            .bind(&id)
            .bind(name)
            .bind(content_type)
            .bind(PictureStatus::Uploading.as_str())
            .bind(caller)
            .bind(OffsetDateTime::now_utc())
            .execute(&self.pool)
            .await?;

        let stored = match self.write(&id, body).await {
            Ok(size) => self.complete(&id, size).await,
            Err(err) => Err(err),
        };
        let size = match stored {
            Ok(size) => size,
            Err(err) => {
                self.discard(&id).await;
                return Err(err);
            }
        };

        tracing::info!(picture_id = %id, name, size, "picture stored");

        self.find(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("picture {id} vanished after upload").into())
    }

    pub async fn find(&self, picture_id: &str) -> AppResult<Option<Picture>> {
        let row: Option<PictureRow> = sqlx::query_as(
            "SELECT id,name,content_type,size,status,owner_id,created_at,completed_at FROM pictures WHERE id=?",
        )
        .bind(picture_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(picture_from_row).transpose()
    }

    /// Opens the bytes of a completed picture.
    pub async fn open_file(&self, picture_id: &str) -> AppResult<(Picture, File)> {
        let picture = self.find_complete(picture_id).await?;
        let file = File::open(self.path(&picture.id)).await?;
        Ok((picture, file))
    }

    pub async fn rename(&self, caller: Option<&str>, picture_id: &str, name: &str) -> AppResult<()> {
        check::non_empty("name", name)?;
        let picture = self.find_complete(picture_id).await?;

        if !self.permissions.update.allows(caller, picture.owner_id.as_deref()) {
            return Err(AppError::Forbidden("Not allowed to update this picture"));
        }

        sqlx::query("UPDATE pictures SET name=? WHERE id=?")
            .bind(name)
            .bind(picture_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, caller: Option<&str>, picture_id: &str) -> AppResult<()> {
        let picture = self.find(picture_id).await?.ok_or(AppError::PictureNotExists)?;

        if !self.permissions.remove.allows(caller, picture.owner_id.as_deref()) {
            return Err(AppError::Forbidden("Not allowed to remove this picture"));
        }

        sqlx::query("DELETE FROM pictures WHERE id=?")
            .bind(picture_id)
            .execute(&self.pool)
            .await?;
        remove_if_exists(self.path(picture_id)).await?;

        tracing::info!(picture_id, "picture removed");
        Ok(())
    }

    async fn find_complete(&self, picture_id: &str) -> AppResult<Picture> {
        match self.find(picture_id).await? {
            Some(picture) if picture.status == PictureStatus::Complete => Ok(picture),
            _ => Err(AppError::PictureNotExists),
        }
    }

    async fn write<S, E>(&self, picture_id: &str, body: S) -> AppResult<u64>
    where
        S: Stream<Item = Result<Bytes, E>>,
        AppError: From<E>,
    {
        let partial = self.partial_path(picture_id);
        let mut file = File::create(&partial).await?;
        let mut body = std::pin::pin!(body);
        let mut received = 0usize;

        // one chunk in flight at a time
        while let Some(chunk) = body.try_next().await? {
            received += chunk.len();
            if received > self.max_upload_bytes {
                return Err(AppError::UploadTooLarge(self.max_upload_bytes));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        let target = self.path(picture_id);
        let quality = self.quality;
        let source = partial.clone();
        let size = tokio::task::spawn_blocking(move || compress::recompress(&source, &target, quality)).await??;

        tokio::fs::remove_file(&partial).await?;
        Ok(size)
    }

    async fn complete(&self, picture_id: &str, size: u64) -> AppResult<u64> {
        sqlx::query("UPDATE pictures SET content_type=?, size=?, status=?, completed_at=? WHERE id=?")
            .bind(compress::CONTENT_TYPE)
            .bind(i64::try_from(size).unwrap_or(i64::MAX))
            .bind(PictureStatus::Complete.as_str())
            .bind(OffsetDateTime::now_utc())
            .bind(picture_id)
            .execute(&self.pool)
            .await?;
        Ok(size)
    }

    /// Marks a failed upload and drops whatever it left on disk.
    async fn discard(&self, picture_id: &str) {
        let marked = sqlx::query("UPDATE pictures SET status=? WHERE id=?")
            .bind(PictureStatus::Failed.as_str())
            .bind(picture_id)
            .execute(&self.pool)
            .await;
        if let Err(err) = marked {
            tracing::warn!(picture_id, %err, "could not mark picture as failed");
        }

        for path in [self.partial_path(picture_id), self.path(picture_id)] {
            if let Err(err) = remove_if_exists(&path).await {
                tracing::warn!(path = %path.display(), %err, "could not clean up upload");
            }
        }
    }

    fn path(&self, picture_id: &str) -> PathBuf {
        self.dir.join(picture_id)
    }

    fn partial_path(&self, picture_id: &str) -> PathBuf {
        self.dir.join(format!("{picture_id}.part"))
    }
}

async fn remove_if_exists(path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use futures_util::stream;
    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::pictures::WritePolicy;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, Rgb([200, 30, 90]))
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn chunks(bytes: Vec<u8>) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        let chunks: Vec<_> = bytes.chunks(100).map(|c| Ok(Bytes::copy_from_slice(c))).collect();
        stream::iter(chunks)
    }

    fn store(pool: SqlitePool, dir: &tempfile::TempDir, policy: WritePolicy) -> PictureStore {
        PictureStore::new(pool, dir.path(), 75, 64 * 1024, StorePermissions::uniform(policy))
    }

    fn files_in(dir: &tempfile::TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    async fn picture_rows(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pictures").fetch_one(pool).await.unwrap();
        count
    }

    #[sqlx::test]
    async fn upload_stores_jpeg(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let store = store(pool, &dir, WritePolicy::Anyone);

        let picture = store.upload(Some("u1"), "cat.png", "image/png", chunks(png(40, 30))).await.unwrap();
        assert_eq!(picture.status, PictureStatus::Complete);
        assert_eq!(picture.content_type, "image/jpeg");
        assert_eq!(picture.name, "cat.png");
        assert_eq!(picture.owner_id.as_deref(), Some("u1"));
        assert!(picture.completed_at.is_some());

        let bytes = std::fs::read(dir.path().join(&picture.id)).unwrap();
        assert_eq!(bytes.len() as i64, picture.size);
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
        // partial file is gone
        assert_eq!(files_in(&dir), 1);
    }

    #[sqlx::test]
    async fn wrong_content_type_writes_nothing(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let store = store(pool.clone(), &dir, WritePolicy::Anyone);

        let result = store.upload(Some("u1"), "notes.txt", "text/plain", chunks(png(4, 4))).await;
        assert!(matches!(result, Err(AppError::InvalidContentType(_))));
        assert_eq!(picture_rows(&pool).await, 0);
        assert_eq!(files_in(&dir), 0);
    }

    #[sqlx::test]
    async fn oversized_upload_fails(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let store = PictureStore::new(pool, dir.path(), 75, 150, StorePermissions::default());

        let result = store.upload(None, "big.png", "image/png", chunks(vec![0; 1000])).await;
        assert!(matches!(result, Err(AppError::UploadTooLarge(150))));
        assert_eq!(files_in(&dir), 0);
    }

    #[sqlx::test]
    async fn undecodable_upload_is_marked_failed(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let store = store(pool.clone(), &dir, WritePolicy::Anyone);

        let result = store.upload(None, "x.png", "image/png", chunks(b"nope".to_vec())).await;
        assert!(matches!(result, Err(AppError::InvalidImage)));

        let (status,): (String,) = sqlx::query_as("SELECT status FROM pictures").fetch_one(&pool).await.unwrap();
        assert_eq!(status, "failed");
        assert_eq!(files_in(&dir), 0);
    }

    #[sqlx::test]
    async fn failed_completion_is_cleaned_up(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let store = store(pool.clone(), &dir, WritePolicy::Anyone);
        sqlx::query(
            "CREATE TRIGGER refuse_complete BEFORE UPDATE OF status ON pictures WHEN NEW.status='complete' \
             BEGIN SELECT RAISE(ABORT, 'refused'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = store.upload(Some("u1"), "cat.png", "image/png", chunks(png(8, 8))).await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let (status,): (String,) = sqlx::query_as("SELECT status FROM pictures").fetch_one(&pool).await.unwrap();
        assert_eq!(status, "failed");
        assert_eq!(files_in(&dir), 0);
    }

    #[sqlx::test]
    async fn failed_pictures_are_not_served(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let store = store(pool.clone(), &dir, WritePolicy::Anyone);
        let _ = store.upload(None, "x.png", "image/png", chunks(b"nope".to_vec())).await;

        let (id,): (String,) = sqlx::query_as("SELECT id FROM pictures").fetch_one(&pool).await.unwrap();
        assert!(matches!(store.open_file(&id).await, Err(AppError::PictureNotExists)));
        assert!(matches!(store.open_file("missing").await, Err(AppError::PictureNotExists)));
    }

    #[sqlx::test]
    async fn owner_policy(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let store = store(pool, &dir, WritePolicy::Owner);

        assert!(matches!(
            store.upload(None, "a.png", "image/png", chunks(png(2, 2))).await,
            Err(AppError::Forbidden(_))
        ));

        let picture = store.upload(Some("u1"), "a.png", "image/png", chunks(png(2, 2))).await.unwrap();
        assert!(matches!(store.rename(Some("u2"), &picture.id, "b.png").await, Err(AppError::Forbidden(_))));
        assert!(matches!(store.remove(Some("u2"), &picture.id).await, Err(AppError::Forbidden(_))));

        store.rename(Some("u1"), &picture.id, "b.png").await.unwrap();
        assert_eq!(store.find(&picture.id).await.unwrap().unwrap().name, "b.png");

        store.remove(Some("u1"), &picture.id).await.unwrap();
        assert!(store.find(&picture.id).await.unwrap().is_none());
        assert_eq!(files_in(&dir), 0);
    }

    #[sqlx::test]
    async fn rename_needs_a_name(pool: SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let store = store(pool, &dir, WritePolicy::Anyone);
        let picture = store.upload(None, "a.png", "image/png", chunks(png(2, 2))).await.unwrap();

        assert!(matches!(
            store.rename(None, &picture.id, "").await,
            Err(AppError::InvalidArgument { field: "name", .. })
        ));
        assert!(matches!(store.rename(None, "missing", "b").await, Err(AppError::PictureNotExists)));
        assert!(matches!(store.remove(None, "missing").await, Err(AppError::PictureNotExists)));
    }
}
