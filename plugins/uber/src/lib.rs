//! # Nebula Uber
//!
//! Rider-side Uber API: product discovery, price and time estimates, ride
//! requests and tracking, receipts, history, payment methods and the
//! partner loyalty endpoints.
//!
//! Inputs are checked before any request is made: coordinates must be in
//! range, ids must be safe to embed in a path, seat counts are clamped to
//! 1..=2. Failures carry `error_type`; a 429 becomes a rate-limit advisory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod client;
mod loyalty;
mod rides;

use nebula_action::prelude::*;

/// Registry category for every Uber action.
pub const CATEGORY: &str = "uber";

/// Production API root. The sandbox lives at `https://sandbox-api.uber.com`;
/// select it with `UBER_API_BASE_URL`.
pub const DEFAULT_BASE_URL: &str = "https://api.uber.com";

fn meta(name: &str, description: &str) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description)
        .with_envelope(
            EnvelopeStyle::result()
                .with_error_type()
                .with_error_prefix(format!("Uber API error in {name}"))
                .with_advisory("Uber"),
        )
        .with_required_credential("access_token")
}

/// Register every Uber action.
pub fn register(registry: &mut ActionRegistry) {
    registry.register_async(
        meta("get_products", "Products available at a location"),
        rides::get_products,
    );
    registry.register_async(
        meta("get_price_estimate", "Price estimates between two points"),
        rides::get_price_estimate,
    );
    registry.register_async(
        meta("get_time_estimate", "Pickup ETAs at a location"),
        rides::get_time_estimate,
    );
    registry.register_async(
        meta("get_ride_estimate", "Fare estimate for a specific product and trip"),
        rides::get_ride_estimate,
    );
    registry.register_async(meta("request_ride", "Request a ride"), rides::request_ride);
    registry.register_async(
        meta("get_ride_status", "Current state of a ride request"),
        rides::get_ride_status,
    );
    registry.register_async(
        meta("get_ride_map", "Live map link for a ride"),
        rides::get_ride_map,
    );
    registry.register_async(meta("cancel_ride", "Cancel a ride request"), rides::cancel_ride);
    registry.register_async(
        meta("get_ride_receipt", "Receipt of a completed ride"),
        rides::get_ride_receipt,
    );

    registry.register_async(
        meta("get_user_profile", "Profile of the authenticated rider"),
        account::get_user_profile,
    );
    registry.register_async(
        meta("get_ride_history", "Past rides, newest first"),
        account::get_ride_history,
    );
    registry.register_async(
        meta("get_payment_methods", "Payment methods on file"),
        account::get_payment_methods,
    );

    registry.register_async(
        meta("link_loyalty_account", "Link a partner loyalty account"),
        loyalty::link_loyalty_account,
    );
    registry.register_async(
        meta("unlink_loyalty_account", "Unlink a partner loyalty account"),
        loyalty::unlink_loyalty_account,
    );
    registry.register_async(
        meta("submit_flight_booking_data", "Send flight booking details to a loyalty partner"),
        loyalty::submit_flight_booking_data,
    );
}
