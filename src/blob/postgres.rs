//! PostgreSQL-based blob store.
//!
//! Table structure:
//! - `blob_files` - one metadata row per blob
//! - `blob_chunks` - payload split into `chunk_size` pieces keyed by `(file_id, n)`
//!
//! Reads fetch one chunk per query so memory use is bounded by the chunk size.
//! Chunk sizes are stored as `INTEGER`, so they are capped at `i32::MAX`.

use async_stream::stream;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{split_chunks, BlobDownload, BlobInfo, BlobStore, BlobStream, NewBlob};
use crate::infrastructure::postgres::PostgresPool;
use crate::storage::StoreError;

type BlobFileRow = (Uuid, String, String, i64, i32, DateTime<Utc>);

/// Largest chunk size the `blob_files.chunk_size` column can hold
const MAX_CHUNK_SIZE: usize = i32::MAX as usize;

pub struct PostgresBlobStore {
    pool: PostgresPool,
    chunk_size: usize,
}

impl PostgresBlobStore {
    pub fn new(pool: PostgresPool, chunk_size: usize) -> Self {
        let clamped = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        if clamped != chunk_size {
            tracing::warn!(
                requested = chunk_size,
                chunk_size = clamped,
                "Blob chunk size out of range, clamped"
            );
        }

        Self {
            pool,
            chunk_size: clamped,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

fn chunk_count(length: i64, chunk_size: i32) -> i32 {
    if length <= 0 || chunk_size <= 0 {
        return 0;
    }
    let chunk_size = i64::from(chunk_size);
    ((length + chunk_size - 1) / chunk_size) as i32
}

async fn fetch_chunk(pool: &PgPool, id: Uuid, n: i32, chunks: i32) -> Result<Bytes, StoreError> {
    let row: Option<(Vec<u8>,)> =
        sqlx::query_as("SELECT data FROM blob_chunks WHERE file_id = $1 AND n = $2")
            .bind(id)
            .bind(n)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::Postgres)?;

    let (data,) = row.ok_or_else(|| StoreError::Corrupt {
        id,
        reason: format!("missing chunk {n} of {chunks}"),
    })?;

    Ok(Bytes::from(data))
}

fn chunk_stream(pool: PgPool, id: Uuid, chunks: i32) -> BlobStream {
    Box::pin(stream! {
        for n in 0..chunks {
            match fetch_chunk(&pool, id, n, chunks).await {
                Ok(data) => {
                    yield Ok(data);
                }
                Err(e) => {
                    tracing::error!(blob_id = %id, chunk = n, error = %e, "Failed to read blob chunk");
                    yield Err(e);
                    break;
                }
            }
        }
    })
}

#[async_trait]
impl BlobStore for PostgresBlobStore {
    async fn put(&self, blob: NewBlob) -> Result<BlobInfo, StoreError> {
        let info = BlobInfo {
            id: Uuid::new_v4(),
            filename: blob.filename,
            content_type: blob.content_type,
            length: blob.data.len() as u64,
            chunk_size: self.chunk_size,
            uploaded_at: Utc::now(),
        };

        let pool = self.pool.ready().await?;
        let mut tx = pool.begin().await.map_err(StoreError::Postgres)?;

        sqlx::query(
            r#"
            INSERT INTO blob_files (id, filename, content_type, length, chunk_size, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(info.id)
        .bind(&info.filename)
        .bind(&info.content_type)
        .bind(info.length as i64)
        .bind(info.chunk_size as i32)
        .bind(info.uploaded_at)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::Postgres)?;

        for (n, chunk) in split_chunks(&blob.data, self.chunk_size).iter().enumerate() {
            sqlx::query("INSERT INTO blob_chunks (file_id, n, data) VALUES ($1, $2, $3)")
                .bind(info.id)
                .bind(n as i32)
                .bind(&chunk[..])
                .execute(&mut *tx)
                .await
                .map_err(StoreError::Postgres)?;
        }

        // The blob is only visible once the transaction commits
        tx.commit().await.map_err(StoreError::Postgres)?;

        tracing::debug!(
            blob_id = %info.id,
            length = info.length,
            "Blob stored in PostgreSQL"
        );

        Ok(info)
    }

    async fn get(&self, id: Uuid) -> Result<Option<BlobDownload>, StoreError> {
        let pool = self.pool.ready().await?;
        let row: Option<BlobFileRow> = sqlx::query_as(
            r#"
            SELECT id, filename, content_type, length, chunk_size, uploaded_at
            FROM blob_files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::Postgres)?;

        let Some((id, filename, content_type, length, chunk_size, uploaded_at)) = row else {
            return Ok(None);
        };

        if length < 0 || (length > 0 && chunk_size <= 0) {
            return Err(StoreError::Corrupt {
                id,
                reason: format!("invalid length {length} / chunk size {chunk_size}"),
            });
        }

        let info = BlobInfo {
            id,
            filename,
            content_type,
            length: length as u64,
            chunk_size: chunk_size.max(0) as usize,
            uploaded_at,
        };
        let stream = chunk_stream(pool.clone(), id, chunk_count(length, chunk_size));

        Ok(Some(BlobDownload { info, stream }))
    }
}
