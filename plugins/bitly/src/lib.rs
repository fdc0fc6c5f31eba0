//! # Nebula Bitly
//!
//! Link shortening, bitlink management, click analytics and account
//! lookups against the Bitly v4 API, authorised with the OAuth
//! `access_token` credential.
//!
//! Bitlinks may be given as a full URL (`https://bit.ly/abc`), as
//! `domain/hash` or as a bare hash; all three address the same link.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod bitlinks;
mod client;

use nebula_action::prelude::*;

pub use client::normalize_bitlink;

/// Registry category for every Bitly action.
pub const CATEGORY: &str = "bitly";

/// Production API root; override with `ClientConfig::with_base_url`.
pub const DEFAULT_BASE_URL: &str = "https://api-ssl.bitly.com/v4";

fn meta(name: &str, description: &str, defaults: Value) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description)
        .with_envelope(EnvelopeStyle::result().with_failure_defaults(defaults))
        .with_required_credential("access_token")
}

/// Register every Bitly action.
pub fn register(registry: &mut ActionRegistry) {
    registry.register_async(
        meta("get_user", "Fetch the authenticated user", json!({"user": {}})),
        account::get_user,
    );

    registry.register_async(
        meta("shorten_url", "Shorten a long URL", json!({"bitlink": {}})),
        bitlinks::shorten_url,
    );
    registry.register_async(
        meta(
            "create_bitlink",
            "Create a bitlink with title, tags or a custom back-half",
            json!({"bitlink": {}}),
        ),
        bitlinks::create_bitlink,
    );
    registry.register_async(
        meta("get_bitlink", "Fetch one bitlink", json!({"bitlink": {}})),
        bitlinks::get_bitlink,
    );
    registry.register_async(
        meta("update_bitlink", "Update title, tags or archive state", json!({"bitlink": {}})),
        bitlinks::update_bitlink,
    );
    registry.register_async(
        meta("expand_bitlink", "Resolve a bitlink to its long URL", json!({"long_url": ""})),
        bitlinks::expand_bitlink,
    );
    registry.register_async(
        meta("get_clicks", "Click counts per time unit", json!({"clicks": []})),
        bitlinks::get_clicks,
    );
    registry.register_async(
        meta(
            "get_clicks_summary",
            "Total clicks over a time window",
            json!({"total_clicks": 0, "unit": "", "units": 0}),
        ),
        bitlinks::get_clicks_summary,
    );
    registry.register_async(
        meta("list_bitlinks", "List the bitlinks of a group", json!({"bitlinks": []})),
        bitlinks::list_bitlinks,
    );

    registry.register_async(
        meta("list_groups", "List the user's groups", json!({"groups": []})),
        account::list_groups,
    );
    registry.register_async(
        meta("get_group", "Fetch one group", json!({"group": {}})),
        account::get_group,
    );
    registry.register_async(
        meta(
            "list_organizations",
            "List the user's organizations",
            json!({"organizations": []}),
        ),
        account::list_organizations,
    );
}
