use std::sync::Arc;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use object_store::{memory::InMemory, ObjectStore};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::StorageError;
use crate::model::VideoMetadata;
use crate::storage::{self, ByteStream};

/// Moves video payloads between callers and the content store.
///
/// Payloads are keyed by the registry id. The gateway never looks at the
/// metadata beyond that id, and whether a payload exists is only discovered
/// by asking the store.
#[derive(Clone)]
pub struct DataGateway {
    store: Arc<dyn ObjectStore>,
}

impl DataGateway {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Gateway over a fresh in-process store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    fn key(id: u64) -> String {
        format!("videos/{id}")
    }

    /// Consume `source` completely and store it as the payload of `entry`.
    ///
    /// On error nothing new becomes visible to `open_data`/`stream_data`.
    pub async fn store_data<S, E>(&self, entry: &VideoMetadata, source: S) -> Result<u64, StorageError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let bytes = storage::put_stream(self.store.as_ref(), &Self::key(entry.id), source).await?;
        tracing::info!(video_id = entry.id, bytes, "Stored video data");
        Ok(bytes)
    }

    /// Open the stored payload of `entry`, or `None` if there is none.
    pub async fn open_data(&self, entry: &VideoMetadata) -> Result<Option<ByteStream>, StorageError> {
        storage::open_stream(self.store.as_ref(), &Self::key(entry.id)).await
    }

    /// Copy the stored payload of `entry` into `destination`.
    ///
    /// Returns `Ok(None)` when no payload was ever stored, without touching
    /// `destination`. Otherwise all bytes are written and the destination is
    /// flushed; an error after the first chunk is an I/O fault, not a miss.
    pub async fn stream_data<W>(
        &self,
        entry: &VideoMetadata,
        destination: &mut W,
    ) -> Result<Option<u64>, StorageError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let Some(mut stream) = self.open_data(entry).await? else {
            return Ok(None);
        };

        let mut copied = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            destination.write_all(&chunk).await?;
            copied += chunk.len() as u64;
        }
        destination.flush().await?;

        tracing::debug!(video_id = entry.id, bytes = copied, "Streamed video data");
        Ok(Some(copied))
    }

    pub async fn has_data(&self, entry: &VideoMetadata) -> Result<bool, StorageError> {
        storage::exists(self.store.as_ref(), &Self::key(entry.id)).await
    }
}
