use anyhow::{Context, Result};
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt, TryStreamExt};
use object_store::{
    aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory, path::Path, ObjectStore,
    WriteMultipart,
};
use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::error::StorageError;

/// Parts buffered by a multipart upload before the source is read further
const MAX_IN_FLIGHT_PARTS: usize = 4;

/// Stored object bytes, chunk by chunk
pub type ByteStream = BoxStream<'static, Result<Bytes, StorageError>>;

/// Create an ObjectStore instance based on configuration
pub fn create_store(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    match config.storage_backend {
        StorageBackend::Memory => Ok(Arc::new(InMemory::new())),
        StorageBackend::Local => {
            std::fs::create_dir_all(&config.local_path)
                .with_context(|| format!("Failed to create {}", config.local_path))?;
            let store = LocalFileSystem::new_with_prefix(&config.local_path)
                .context("Failed to create local filesystem store")?;
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let mut builder = AmazonS3Builder::new()
                .with_bucket_name(&config.s3_bucket)
                .with_region(&config.s3_region)
                .with_access_key_id(&config.s3_access_key)
                .with_secret_access_key(&config.s3_secret_key);

            if let Some(endpoint) = &config.s3_endpoint {
                builder = builder.with_endpoint(endpoint);
                // For MinIO and other S3-compatible services
                builder = builder.with_allow_http(true);
            }

            let store = builder.build().context("Failed to create S3 store")?;
            Ok(Arc::new(store))
        }
    }
}

/// Stream `source` into the object at `path`.
///
/// Uses a multipart upload, so the object only becomes readable once every
/// byte has been accepted. If the source or the store fails midway the
/// upload is aborted and any previous object at `path` is left untouched.
///
/// # Returns
/// Number of bytes written
pub async fn put_stream<S, E>(
    store: &dyn ObjectStore,
    path: &str,
    mut source: S,
) -> Result<u64, StorageError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = Path::from(path);
    let upload = store.put_multipart(&path).await?;
    let mut writer = WriteMultipart::new(upload);

    match copy_parts(&mut writer, &mut source).await {
        Ok(written) => {
            writer.finish().await?;
            Ok(written)
        }
        Err(e) => {
            if let Err(abort_err) = writer.abort().await {
                tracing::warn!(%path, error = %abort_err, "Failed to abort multipart upload");
            }
            Err(e)
        }
    }
}

async fn copy_parts<S, E>(writer: &mut WriteMultipart, source: &mut S) -> Result<u64, StorageError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut written = 0u64;
    while let Some(chunk) = source.next().await {
        let chunk = chunk.map_err(|e| StorageError::Source(e.into()))?;
        writer.wait_for_capacity(MAX_IN_FLIGHT_PARTS).await?;
        writer.write(&chunk);
        written += chunk.len() as u64;
    }
    Ok(written)
}

/// Open the object at `path` for streaming.
///
/// Returns `None` if nothing is stored there.
pub async fn open_stream(store: &dyn ObjectStore, path: &str) -> Result<Option<ByteStream>, StorageError> {
    let path = Path::from(path);
    match store.get(&path).await {
        Ok(result) => Ok(Some(result.into_stream().map_err(StorageError::from).boxed())),
        Err(object_store::Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Check if object exists
pub async fn exists(store: &dyn ObjectStore, path: &str) -> Result<bool, StorageError> {
    let path = Path::from(path);
    match store.head(&path).await {
        Ok(_) => Ok(true),
        Err(object_store::Error::NotFound { .. }) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
