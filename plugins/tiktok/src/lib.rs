//! # Nebula TikTok
//!
//! Posting and profile actions over the TikTok v2 Content Posting and
//! Display APIs, authorised with the OAuth `access_token` credential.
//!
//! TikTok reports most failures inside the response body
//! (`{"error": {"code": "...", "log_id": "..."}}`), so every response is
//! checked for an error object before its `data` is used. Failures carry the
//! TikTok error code:
//!
//! ```json
//! {"result": false, "error": "Access token is invalid or expired.", "error_code": "access_token_invalid"}
//! ```
//!
//! Videos are uploaded from base64 file content in sequential chunks; see
//! [`UploadPlan`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod client;
mod posts;
mod upload;

use nebula_action::{ActionMetadata, ActionRegistry, EnvelopeStyle};

pub use upload::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MAX_VIDEO_SIZE, MIN_CHUNK_SIZE, UploadPlan};

/// Registry category for every TikTok action.
pub const CATEGORY: &str = "tiktok";

/// Production API root; override with `ClientConfig::with_base_url`.
pub const DEFAULT_BASE_URL: &str = "https://open.tiktokapis.com/v2";

fn meta(name: &str, description: &str) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description)
        .with_envelope(EnvelopeStyle::result().with_error_code())
        .with_required_credential("access_token")
}

/// Register every TikTok action.
pub fn register(registry: &mut ActionRegistry) {
    registry.register_async(
        meta("get_user_info", "Fetch the connected user's profile and stats"),
        account::get_user_info,
    );
    registry.register_async(
        meta("get_creator_info", "Fetch what the creator is allowed to post"),
        account::get_creator_info,
    );
    registry.register_async(
        meta("create_video_post", "Upload and publish a video"),
        posts::create_video_post,
    );
    registry.register_async(
        meta("upload_video_draft", "Upload a video to the creator's inbox as a draft"),
        posts::upload_video_draft,
    );
    registry.register_async(
        meta("get_post_status", "Check the processing status of a post"),
        posts::get_post_status,
    );
    registry.register_async(
        meta("get_videos", "List the user's public videos"),
        posts::get_videos,
    );
    registry.register_async(
        meta("create_photo_post", "Publish a photo carousel from URLs"),
        posts::create_photo_post,
    );
}
