use axum::{
    body::Body,
    extract::{Host, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::router::AppState;
use crate::model::{VideoMetadata, VideoStatus};

/// Multipart part carrying the video bytes
pub const DATA_PART: &str = "data";

/// Used when an entry has no content type of its own
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn list_videos(State(state): State<AppState>) -> Json<Vec<VideoMetadata>> {
    Json(state.registry.list())
}

pub async fn add_video(
    State(state): State<AppState>,
    host: Option<Host>,
    Json(candidate): Json<VideoMetadata>,
) -> Json<VideoMetadata> {
    let base_url = base_url(&state, host.as_ref());
    let video = state.registry.add(candidate, &base_url);
    info!(video_id = video.id, title = %video.title, "Video added");
    Json(video)
}

/// Scheme and authority used to build data URLs
fn base_url(state: &AppState, host: Option<&Host>) -> String {
    if let Some(base) = &state.config.public_base_url {
        return base.clone();
    }
    match host {
        Some(Host(host)) => format!("http://{host}"),
        None => {
            warn!(
                listen_addr = %state.config.listen_addr,
                "No Host header and no PUBLIC_BASE_URL; data URL built from listen address"
            );
            format!("http://{}", state.config.listen_addr)
        }
    }
}

pub async fn upload_data(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> Result<Json<VideoStatus>, ApiError> {
    let video = state.registry.find_by_id(id).ok_or(ApiError::NotFound(id))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(DATA_PART) {
            debug!(video_id = id, part = ?field.name(), "Skipping multipart part");
            continue;
        }

        return match state.gateway.store_data(&video, Box::pin(field)).await {
            Ok(_) => Ok(Json(VideoStatus::ready())),
            Err(source) => Err(ApiError::UploadFailed { id, source }),
        };
    }

    warn!(video_id = id, "Upload without a data part");
    Err(ApiError::BadRequest(format!(
        "multipart body has no '{DATA_PART}' part"
    )))
}

pub async fn download_data(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, ApiError> {
    let video = state.registry.find_by_id(id).ok_or(ApiError::NotFound(id))?;
    let stream = state
        .gateway
        .open_data(&video)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    let content_type = if video.content_type.is_empty() {
        HeaderValue::from_static(DEFAULT_CONTENT_TYPE)
    } else {
        HeaderValue::from_str(&video.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
    };

    debug!(video_id = id, "Streaming video data");
    Ok((
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(stream),
    )
        .into_response())
}
