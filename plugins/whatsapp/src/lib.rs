//! # Nebula WhatsApp
//!
//! Messaging through the WhatsApp Business Cloud API (Graph v18.0).
//!
//! Envelopes use the `success` status key. Failures always carry
//! `message_id: ""` (or `UNKNOWN` health fields) and network failures are
//! prefixed with what was being attempted, e.g.
//! `"Failed to send message: HTTP 401: ..."`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod health;
mod messages;

use nebula_action::prelude::*;

pub use client::is_e164;

/// Registry category for every WhatsApp action.
pub const CATEGORY: &str = "whatsapp";

/// Graph API root, version included.
pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v18.0";

fn meta(name: &str, description: &str, prefix: &'static str, defaults: Value) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description)
        .with_envelope(
            EnvelopeStyle::success()
                .with_error_prefix(prefix)
                .with_failure_defaults(defaults),
        )
        .with_required_credential("access_token")
}

/// Register every WhatsApp action.
pub fn register(registry: &mut ActionRegistry) {
    let sent = || json!({"message_id": ""});

    registry.register_async(
        meta(
            "send_message",
            "Send a text message",
            "Failed to send message",
            sent(),
        ),
        messages::send_text,
    );
    registry.register_async(
        meta(
            "send_template_message",
            "Send a pre-approved template message",
            "Failed to send template message",
            sent(),
        ),
        messages::send_template,
    );
    registry.register_async(
        meta(
            "send_media_message",
            "Send an image, video, document, audio or sticker by URL",
            "Failed to send media message",
            sent(),
        ),
        messages::send_media,
    );
    registry.register_async(
        meta(
            "get_phone_number_health",
            "Status and quality rating of a business number",
            "Failed to get phone number health",
            json!({"status": "UNKNOWN", "quality_rating": "UNKNOWN"}),
        ),
        health::get_phone_number_health,
    );
}
