//! Video payload validation and chunked upload.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use nebula_action::prelude::*;

const MIB: u64 = 1024 * 1024;

/// Smallest chunk TikTok accepts (except for a video smaller than this).
pub const MIN_CHUNK_SIZE: u64 = 5 * MIB;
/// Largest chunk TikTok accepts.
pub const MAX_CHUNK_SIZE: u64 = 64 * MIB;
/// Chunk size used when the caller does not pick one.
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * MIB;
/// Largest video accepted for upload.
pub const MAX_VIDEO_SIZE: u64 = 287 * MIB;

/// Decode the video from `file.content` or the first of `files`.
pub(crate) fn video_content(input: &ActionInput) -> Result<Bytes, ActionError> {
    let file = input
        .non_empty("file")
        .or_else(|| input.opt_array("files").and_then(|files| files.first()))
        .ok_or_else(|| {
            ActionError::validation("A video file is required. Provide 'file' or 'files' with video content.")
        })?;

    let encoded = file
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ActionError::validation("File content is empty"))?;

    let video = STANDARD
        .decode(encoded)
        .map_err(|e| ActionError::validation(format!("Invalid base64 encoding: {e}")))?;

    if video.is_empty() {
        return Err(ActionError::validation("Video content is empty"));
    }
    let size = video.len() as u64;
    if size > MAX_VIDEO_SIZE {
        return Err(ActionError::validation(format!(
            "Video size ({size} bytes) exceeds maximum allowed ({MAX_VIDEO_SIZE} bytes)"
        )));
    }
    Ok(Bytes::from(video))
}

/// How a video is split for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    /// Total video size in bytes.
    pub video_size: u64,
    /// Bytes per chunk; the last chunk may be shorter.
    pub chunk_size: u64,
    /// Number of chunks.
    pub chunk_count: u64,
}

impl UploadPlan {
    /// A video under the minimum chunk size goes up in one piece; otherwise
    /// the requested size is clamped to the accepted range.
    pub fn new(video_size: u64, requested_chunk: Option<u64>) -> Self {
        let chunk_size = if video_size < MIN_CHUNK_SIZE {
            video_size
        } else {
            requested_chunk
                .unwrap_or(DEFAULT_CHUNK_SIZE)
                .clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
        };
        let chunk_count = if video_size <= chunk_size {
            1
        } else {
            video_size.div_ceil(chunk_size)
        };
        Self {
            video_size,
            chunk_size,
            chunk_count,
        }
    }

    /// Inclusive byte range of each chunk.
    pub fn ranges(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        (0..self.chunk_count).map(|i| {
            let start = i * self.chunk_size;
            let end = (start + self.chunk_size).min(self.video_size);
            (start, end - 1)
        })
    }

    /// The `source_info` object for a `FILE_UPLOAD` init request.
    pub fn source_info(&self) -> Value {
        json!({
            "source": "FILE_UPLOAD",
            "video_size": self.video_size,
            "chunk_size": self.chunk_size,
            "total_chunk_count": self.chunk_count,
        })
    }
}

/// PUT every chunk to `upload_url` in order, stopping at the first failure.
pub(crate) async fn upload_chunks(
    ctx: &ExecutionContext,
    upload_url: &str,
    video: &Bytes,
    plan: &UploadPlan,
) -> Result<(), ActionError> {
    for (index, (first, last)) in plan.ranges().enumerate() {
        ctx.check_cancelled()?;
        let chunk = video.slice(first as usize..=last as usize);
        let request = HttpRequest::put(upload_url)
            .raw(chunk, "video/mp4")
            .header("Content-Range", format!("bytes {first}-{last}/{}", plan.video_size));

        let response = ctx.send(request).await?;
        if !matches!(response.status, 200 | 201 | 206) {
            let detail = response
                .error_message()
                .unwrap_or_else(|| response.body.to_string());
            tracing::warn!(
                chunk = index + 1,
                total = plan.chunk_count,
                status = response.status,
                "video chunk upload failed"
            );
            return Err(ActionError::api(
                ErrorKind::ApiError,
                format!("Failed to upload chunk {}/{}: {detail}", index + 1, plan.chunk_count),
            )
            .with_code("upload_failed"));
        }
        tracing::debug!(chunk = index + 1, total = plan.chunk_count, "video chunk uploaded");
    }
    Ok(())
}
