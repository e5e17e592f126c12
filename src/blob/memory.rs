//! In-memory blob store using DashMap.
//!
//! Blobs are lost on service restart.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use futures::StreamExt;
use uuid::Uuid;

use super::{split_chunks, BlobDownload, BlobInfo, BlobStore, NewBlob};
use crate::storage::StoreError;

pub struct MemoryBlobStore {
    blobs: DashMap<Uuid, (BlobInfo, Bytes)>,
    chunk_size: usize,
}

impl MemoryBlobStore {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            blobs: DashMap::new(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, blob: NewBlob) -> Result<BlobInfo, StoreError> {
        let info = BlobInfo {
            id: Uuid::new_v4(),
            filename: blob.filename,
            content_type: blob.content_type,
            length: blob.data.len() as u64,
            chunk_size: self.chunk_size,
            uploaded_at: Utc::now(),
        };

        self.blobs.insert(info.id, (info.clone(), blob.data));

        tracing::debug!(
            blob_id = %info.id,
            length = info.length,
            "Blob stored in memory"
        );

        Ok(info)
    }

    async fn get(&self, id: Uuid) -> Result<Option<BlobDownload>, StoreError> {
        let Some(entry) = self.blobs.get(&id) else {
            return Ok(None);
        };
        let (info, data) = entry.value().clone();
        drop(entry);

        let chunks = split_chunks(&data, info.chunk_size);
        let stream = futures::stream::iter(chunks.into_iter().map(Ok)).boxed();

        Ok(Some(BlobDownload { info, stream }))
    }
}
