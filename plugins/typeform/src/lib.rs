//! # Nebula Typeform
//!
//! Forms, responses, workspaces, themes, images and webhooks on the
//! Typeform Create and Responses APIs.
//!
//! Every action answers a 429 with a rate-limit advisory rather than
//! retrying: the envelope says how long to wait and whether the caller
//! may try again, echoing `_retry_attempt` on the next call.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod client;
mod forms;
mod webhooks;
mod workspaces;

use nebula_action::prelude::*;

/// Registry category for every Typeform action.
pub const CATEGORY: &str = "typeform";

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.typeform.com";

fn meta(name: &str, description: &str, defaults: Value) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description)
        .with_envelope(
            EnvelopeStyle::result()
                .with_advisory("Typeform")
                .with_failure_defaults(defaults),
        )
        .with_required_credential("access_token")
}

fn page(key: &str) -> Value {
    json!({ key: [], "total_items": 0, "page_count": 0 })
}

/// Register every Typeform action.
pub fn register(registry: &mut ActionRegistry) {
    registry.register_async(
        meta("get_current_user", "Fetch the account behind the token", json!({"user": {}})),
        forms::get_current_user,
    );

    registry.register_async(meta("list_forms", "List forms", page("forms")), forms::list_forms);
    registry.register_async(meta("get_form", "Fetch one form", json!({"form": {}})), forms::get_form);
    registry.register_async(
        meta("create_form", "Create a form", json!({"form": {}})),
        forms::create_form,
    );
    registry.register_async(
        meta(
            "update_form",
            "Replace a form or patch its title and settings",
            json!({"form": {}}),
        ),
        forms::update_form,
    );
    registry.register_async(
        meta("delete_form", "Delete a form", json!({"deleted": false})),
        forms::delete_form,
    );
    registry.register_async(
        meta("list_responses", "List a form's responses", page("responses")),
        forms::list_responses,
    );
    registry.register_async(
        meta(
            "delete_responses",
            "Delete responses by id",
            json!({"deleted": false, "deleted_response_ids": []}),
        ),
        forms::delete_responses,
    );

    registry.register_async(
        meta("list_workspaces", "List workspaces", page("workspaces")),
        workspaces::list_workspaces,
    );
    registry.register_async(
        meta("get_workspace", "Fetch one workspace", json!({"workspace": {}})),
        workspaces::get_workspace,
    );
    registry.register_async(
        meta("create_workspace", "Create a workspace", json!({"workspace": {}})),
        workspaces::create_workspace,
    );
    registry.register_async(
        meta("update_workspace", "Rename a workspace", json!({"workspace": {}})),
        workspaces::update_workspace,
    );
    registry.register_async(
        meta("delete_workspace", "Delete a workspace", json!({"deleted": false})),
        workspaces::delete_workspace,
    );

    registry.register_async(meta("list_themes", "List themes", page("themes")), assets::list_themes);
    registry.register_async(
        meta("get_theme", "Fetch one theme", json!({"theme": {}})),
        assets::get_theme,
    );
    registry.register_async(
        meta("create_theme", "Create a theme", json!({"theme": {}})),
        assets::create_theme,
    );
    registry.register_async(
        meta("delete_theme", "Delete a theme", json!({"deleted": false})),
        assets::delete_theme,
    );
    registry.register_async(
        meta("list_images", "List uploaded images", json!({"images": []})),
        assets::list_images,
    );
    registry.register_async(
        meta("get_image", "Fetch one image", json!({"image": {}})),
        assets::get_image,
    );
    registry.register_async(
        meta("delete_image", "Delete an image", json!({"deleted": false})),
        assets::delete_image,
    );

    registry.register_async(
        meta("list_webhooks", "List a form's webhooks", json!({"webhooks": []})),
        webhooks::list_webhooks,
    );
    registry.register_async(
        meta("get_webhook", "Fetch one webhook by tag", json!({"webhook": {}})),
        webhooks::get_webhook,
    );
    registry.register_async(
        meta("create_webhook", "Create or replace a webhook", json!({"webhook": {}})),
        webhooks::create_webhook,
    );
    registry.register_async(
        meta("delete_webhook", "Delete a webhook", json!({"deleted": false})),
        webhooks::delete_webhook,
    );
}
