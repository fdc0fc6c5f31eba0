//! Publishing: direct video posts, inbox drafts, photo posts and status.

use nebula_action::input::as_integer;
use nebula_action::prelude::*;

use crate::account::normalize;
use crate::client;
use crate::upload::{self, UploadPlan};

const MAX_CAPTION_CHARS: usize = 2200;
const MAX_PHOTOS: usize = 35;
const MAX_VIDEOS_PER_PAGE: i64 = 20;

const VIDEO_FIELDS: [(&str, fn() -> Value); 12] = [
    ("id", || json!("")),
    ("title", || json!("")),
    ("cover_image_url", || json!("")),
    ("share_url", || json!("")),
    ("create_time", || json!(0)),
    ("duration", || json!(0)),
    ("width", || json!(0)),
    ("height", || json!(0)),
    ("like_count", || json!(0)),
    ("comment_count", || json!(0)),
    ("share_count", || json!(0)),
    ("view_count", || json!(0)),
];

fn caption(input: &ActionInput) -> Option<String> {
    input
        .opt_str("title")
        .map(|t| t.chars().take(MAX_CAPTION_CHARS).collect())
}

fn video_post_info(input: &ActionInput) -> Value {
    let mut info = Map::new();
    info.insert("privacy_level".into(), json!(input.str_or("privacy_level", "PUBLIC_TO_EVERYONE")));
    info.insert("disable_comment".into(), json!(input.bool_or("disable_comment", false)));
    info.insert("disable_duet".into(), json!(input.bool_or("disable_duet", false)));
    info.insert("disable_stitch".into(), json!(input.bool_or("disable_stitch", false)));
    if let Some(title) = caption(input) {
        info.insert("title".into(), json!(title));
    }
    if let Some(ms) = input.opt_i64("video_cover_timestamp_ms") {
        info.insert("video_cover_timestamp_ms".into(), json!(ms));
    }
    for key in ["brand_content_toggle", "brand_organic_toggle"] {
        if let Some(flag) = input.opt_bool(key) {
            info.insert(key.into(), json!(flag));
        }
    }
    Value::Object(info)
}

/// Init an upload at `path`, then send the chunks to the returned URL.
async fn upload_video(
    input: &ActionInput,
    ctx: &ExecutionContext,
    path: &str,
    post_info: Option<Value>,
) -> Result<Value, ActionError> {
    let video = upload::video_content(input)?;
    let plan = UploadPlan::new(video.len() as u64, input.opt_u64("chunk_size"));

    let mut body = json!({ "source_info": plan.source_info() });
    if let (Some(info), Some(map)) = (post_info, body.as_object_mut()) {
        map.insert("post_info".into(), info);
    }
    let data = client::post(ctx, path, body).await?;

    let publish_id = data.get("publish_id").and_then(Value::as_str).unwrap_or_default();
    let upload_url = data
        .get("upload_url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            ActionError::api(ErrorKind::ApiError, "No upload URL returned from TikTok")
                .with_code("missing_upload_url")
        })?;

    tracing::info!(publish_id, chunks = plan.chunk_count, bytes = plan.video_size, "uploading video");
    upload::upload_chunks(ctx, upload_url, &video, &plan).await?;

    Ok(json!({ "publish_id": publish_id, "status": "PROCESSING_UPLOAD" }))
}

pub(crate) async fn create_video_post(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let post_info = video_post_info(&input);
    upload_video(&input, &ctx, "post/publish/video/init/", Some(post_info)).await
}

pub(crate) async fn upload_video_draft(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    upload_video(&input, &ctx, "post/publish/inbox/video/init/", None).await
}

pub(crate) async fn create_photo_post(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let photos = input.opt_str_list("photo_urls").unwrap_or_default();
    if photos.is_empty() {
        return Err(ActionError::validation(
            "photo_urls is required and must contain at least one URL",
        ));
    }
    if photos.len() > MAX_PHOTOS {
        return Err(ActionError::validation(format!(
            "Maximum {MAX_PHOTOS} photos allowed per post"
        )));
    }

    let mut info = Map::new();
    info.insert("privacy_level".into(), json!(input.str_or("privacy_level", "PUBLIC_TO_EVERYONE")));
    info.insert("disable_comment".into(), json!(input.bool_or("disable_comment", false)));
    if let Some(title) = caption(&input) {
        info.insert("title".into(), json!(title));
    }
    if input.bool_or("auto_add_music", false) {
        info.insert("auto_add_music".into(), json!(true));
    }

    let data = client::post(
        &ctx,
        "post/publish/content/init/",
        json!({
            "post_info": info,
            "source_info": {"source": "PULL_FROM_URL", "photo_images": photos},
            "post_mode": "DIRECT_POST",
            "media_type": "PHOTO",
        }),
    )
    .await?;

    Ok(json!({
        "publish_id": data.get("publish_id").and_then(Value::as_str).unwrap_or_default(),
        "status": "PROCESSING_DOWNLOAD",
    }))
}

pub(crate) async fn get_post_status(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let publish_id = input.require_str("publish_id")?;
    let data = client::post(&ctx, "post/publish/status/fetch/", json!({ "publish_id": publish_id })).await?;

    // TikTok spells it `publicaly`; both spellings are returned.
    let post_ids = data
        .get("publicaly_available_post_id")
        .cloned()
        .unwrap_or_else(|| json!([]));
    let text = |key: &str| data.get(key).and_then(Value::as_str).unwrap_or_default();
    Ok(json!({
        "status": text("status"),
        "fail_reason": text("fail_reason"),
        "publicaly_available_post_id": post_ids,
        "publicly_available_post_id": post_ids,
        "uploaded_bytes": data.get("uploaded_bytes").cloned().unwrap_or_else(|| json!(0)),
        "error_code": text("error_code"),
    }))
}

pub(crate) async fn get_videos(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    // Anything that is not a positive integer asks for one video.
    let max_count = input
        .get("max_count")
        .map_or(MAX_VIDEOS_PER_PAGE, |v| as_integer(v).unwrap_or(1))
        .clamp(1, MAX_VIDEOS_PER_PAGE);
    let fields: Vec<&str> = VIDEO_FIELDS.iter().map(|(k, _)| *k).collect();

    let mut body = json!({ "max_count": max_count, "fields": fields });
    if let Some(cursor) = input.get("cursor") {
        let cursor = cursor
            .as_i64()
            .ok_or_else(|| ActionError::validation("cursor must be an integer"))?;
        if let Some(map) = body.as_object_mut() {
            map.insert("cursor".into(), json!(cursor));
        }
    }

    let data = client::post(&ctx, "video/list/", body).await?;
    let videos: Vec<Value> = data
        .get("videos")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|v| normalize(v, &VIDEO_FIELDS))
        .collect();

    Ok(json!({
        "videos": videos,
        "cursor": data.get("cursor").cloned().unwrap_or(Value::Null),
        "has_more": data.get("has_more").and_then(Value::as_bool).unwrap_or(false),
    }))
}
