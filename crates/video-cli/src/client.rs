use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::{multipart, Response, StatusCode};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;
use video_service::{VideoMetadata, VideoStatus};

use crate::error::ClientError;

/// Typed client for the video service HTTP API
pub struct VideoClient {
    http: reqwest::Client,
    base: Url,
}

impl VideoClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        // Url::join drops the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    fn data_endpoint(&self, id: u64) -> Result<Url, ClientError> {
        self.endpoint(&format!("video/{id}/data"))
    }

    pub async fn list(&self) -> Result<Vec<VideoMetadata>, ClientError> {
        let response = self.http.get(self.endpoint("video")?).send().await?;
        Ok(expect_ok(response).await?.json().await?)
    }

    pub async fn add(&self, video: &VideoMetadata) -> Result<VideoMetadata, ClientError> {
        let response = self
            .http
            .post(self.endpoint("video")?)
            .json(video)
            .send()
            .await?;
        Ok(expect_ok(response).await?.json().await?)
    }

    /// Upload the file at `path` as the payload of video `id`
    pub async fn upload_file(
        &self,
        id: u64,
        path: &Path,
        content_type: &str,
    ) -> Result<VideoStatus, ClientError> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{id}"));

        let part = multipart::Part::stream_with_length(file, length)
            .file_name(file_name)
            .mime_str(content_type)?;

        tracing::debug!(video_id = id, bytes = length, "Uploading video data");
        self.upload(id, part).await
    }

    pub async fn upload_bytes(
        &self,
        id: u64,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<VideoStatus, ClientError> {
        let part = multipart::Part::bytes(data)
            .file_name(format!("{id}"))
            .mime_str(content_type)?;
        self.upload(id, part).await
    }

    async fn upload(&self, id: u64, part: multipart::Part) -> Result<VideoStatus, ClientError> {
        let form = multipart::Form::new().part("data", part);
        let response = self
            .http
            .post(self.data_endpoint(id)?)
            .multipart(form)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(id)),
            StatusCode::INTERNAL_SERVER_ERROR => Err(ClientError::UploadIncomplete(id)),
            _ => Ok(expect_ok(response).await?.json().await?),
        }
    }

    /// Request the payload of video `id`, failing before any byte is read
    /// if the server has none.
    async fn open_data(&self, id: u64) -> Result<Response, ClientError> {
        let response = self.http.get(self.data_endpoint(id)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id));
        }
        expect_ok(response).await
    }

    /// Stream the payload of video `id` into `destination`.
    ///
    /// # Returns
    /// Number of bytes written
    pub async fn download<W>(&self, id: u64, destination: &mut W) -> Result<u64, ClientError>
    where
        W: AsyncWrite + Unpin,
    {
        let response = self.open_data(id).await?;
        write_body(id, response, destination).await
    }

    /// Download the payload of video `id` to `path`.
    ///
    /// Bytes go to a `.part` file next to `path` that replaces it only once
    /// the transfer completed, so a failed download leaves `path` as it was.
    pub async fn download_to_file(&self, id: u64, path: &Path) -> Result<u64, ClientError> {
        let response = self.open_data(id).await?;
        let partial = partial_path(path);

        match write_file(id, response, &partial).await {
            Ok(written) => {
                tokio::fs::rename(&partial, path).await?;
                Ok(written)
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    tracing::debug!(path = %partial.display(), error = %cleanup, "Failed to remove partial download");
                }
                Err(e)
            }
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

async fn write_file(id: u64, response: Response, path: &Path) -> Result<u64, ClientError> {
    let mut file = tokio::fs::File::create(path).await?;
    let written = write_body(id, response, &mut file).await?;
    file.sync_all().await?;
    Ok(written)
}

async fn write_body<W>(id: u64, response: Response, destination: &mut W) -> Result<u64, ClientError>
where
    W: AsyncWrite + Unpin,
{
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        destination.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    destination.flush().await?;

    tracing::debug!(video_id = id, bytes = written, "Downloaded video data");
    Ok(written)
}

async fn expect_ok(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}
