//! # Nebula Humanitix
//!
//! Event ticketing actions against the Humanitix public API: events,
//! orders, tickets, tags, and ticket check-in/check-out.
//!
//! Authentication is an API key sent in the `x-api-key` header, read from
//! the `api_key` credential.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod checkin;
mod client;
mod resources;

use futures::FutureExt;
use nebula_action::{ActionMetadata, ActionRegistry};

/// Registry category for every Humanitix action.
pub const CATEGORY: &str = "humanitix";

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.humanitix.com/v1";

fn meta(name: &str, description: &str) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description).with_required_credential("api_key")
}

/// Register every Humanitix action.
pub fn register(registry: &mut ActionRegistry) {
    registry.register_fn(
        meta("get_events", "Fetch one event or page through all events"),
        |i, c| resources::get_events(i, c).boxed(),
    );
    registry.register_fn(
        meta("get_orders", "Fetch one order or page through an event's orders"),
        |i, c| resources::get_orders(i, c).boxed(),
    );
    registry.register_fn(
        meta("get_tickets", "Fetch one ticket or page through an event's tickets"),
        |i, c| resources::get_tickets(i, c).boxed(),
    );
    registry.register_fn(
        meta("get_tags", "Fetch one tag or page through all tags"),
        |i, c| resources::get_tags(i, c).boxed(),
    );
    registry.register_fn(meta("check_in", "Check a ticket in"), |i, c| {
        checkin::check_in(i, c).boxed()
    });
    registry.register_fn(meta("check_out", "Check a ticket out"), |i, c| {
        checkin::check_out(i, c).boxed()
    });
    tracing::debug!(category = CATEGORY, "registered actions");
}
