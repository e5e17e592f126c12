//! Binary asset storage.
//!
//! Uploaded images are stored verbatim, split into fixed-size chunks, and
//! read back as a stream so a download never holds the whole payload.

mod memory;
mod postgres;

pub use memory::MemoryBlobStore;
pub use postgres::PostgresBlobStore;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::Serialize;
use uuid::Uuid;

use crate::storage::StoreError;

/// Stream of blob chunks in order.
pub type BlobStream = BoxStream<'static, Result<Bytes, StoreError>>;

/// Blob to be written.
#[derive(Debug, Clone)]
pub struct NewBlob {
    /// Store-unique name, see [`unique_filename`]
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Metadata of a stored blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobInfo {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub length: u64,
    pub chunk_size: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// A blob opened for reading.
pub struct BlobDownload {
    pub info: BlobInfo,
    pub stream: BlobStream,
}

impl BlobDownload {
    /// Collect the whole payload. Intended for small blobs and tests.
    pub async fn into_bytes(self) -> Result<Bytes, StoreError> {
        let chunks: Vec<Bytes> = self.stream.try_collect().await?;
        Ok(Bytes::from(chunks.concat()))
    }
}

/// Id-addressed binary store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a blob. Returns once the write is durable.
    async fn put(&self, blob: NewBlob) -> Result<BlobInfo, StoreError>;

    /// Open a blob for reading, `None` if the id is unknown.
    async fn get(&self, id: Uuid) -> Result<Option<BlobDownload>, StoreError>;
}

/// Prefix the client filename with the upload time in milliseconds.
pub fn unique_filename(original: &str, uploaded_at: DateTime<Utc>) -> String {
    format!("{}-{}", uploaded_at.timestamp_millis(), original)
}

/// Split a payload into `chunk_size` slices without copying.
pub(crate) fn split_chunks(data: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect()
}
