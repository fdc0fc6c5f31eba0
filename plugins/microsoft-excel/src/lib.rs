//! # Nebula Microsoft Excel
//!
//! Workbook, worksheet, range and table actions over the Microsoft Graph
//! workbook API for files in the signed-in user's OneDrive.
//!
//! Requests carry the OAuth `access_token` credential. Worksheet and table
//! names are percent-encoded as single path segments; range addresses keep
//! their `:` so A1 notation reaches Graph intact.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod ranges;
mod tables;
mod workbooks;

use nebula_action::prelude::*;

/// Registry category for every Excel action.
pub const CATEGORY: &str = "microsoft_excel";

/// Graph API root; override with `ClientConfig::with_base_url`.
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

fn meta(name: &str, description: &str, defaults: Value) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description)
        .with_envelope(EnvelopeStyle::result().with_failure_defaults(defaults))
        .with_required_credential("access_token")
}

/// Register every Excel action.
pub fn register(registry: &mut ActionRegistry) {
    // Workbooks and worksheets
    registry.register_async(
        meta(
            "excel_list_workbooks",
            "List Excel workbooks in OneDrive",
            json!({"workbooks": []}),
        ),
        workbooks::list_workbooks,
    );
    registry.register_async(
        meta(
            "excel_get_workbook",
            "Fetch a workbook with its worksheets, tables and named ranges",
            json!({}),
        ),
        workbooks::get_workbook,
    );
    registry.register_async(
        meta(
            "excel_list_worksheets",
            "List the worksheets of a workbook",
            json!({"worksheets": []}),
        ),
        workbooks::list_worksheets,
    );
    registry.register_async(
        meta("excel_create_worksheet", "Add a worksheet", json!({})),
        workbooks::create_worksheet,
    );
    registry.register_async(
        meta("excel_delete_worksheet", "Delete a worksheet", json!({"deleted": false})),
        workbooks::delete_worksheet,
    );
    registry.register_async(
        meta(
            "excel_get_used_range",
            "Read the used range of a worksheet",
            json!({}),
        ),
        workbooks::get_used_range,
    );

    // Ranges
    registry.register_async(
        meta("excel_read_range", "Read cell values from a range", json!({})),
        ranges::read_range,
    );
    registry.register_async(
        meta("excel_write_range", "Write cell values to a range", json!({})),
        ranges::write_range,
    );
    registry.register_async(
        meta("excel_sort_range", "Sort a range by columns", json!({"sorted": false})),
        ranges::sort_range,
    );
    registry.register_async(
        meta(
            "excel_format_range",
            "Apply font, fill, alignment and number formats to a range",
            json!({"formatted": false}),
        ),
        ranges::format_range,
    );

    // Tables
    registry.register_async(
        meta("excel_list_tables", "List tables in a workbook or worksheet", json!({"tables": []})),
        tables::list_tables,
    );
    registry.register_async(
        meta(
            "excel_get_table_data",
            "Read table rows as objects keyed by header",
            json!({}),
        ),
        tables::get_table_data,
    );
    registry.register_async(
        meta("excel_add_table_row", "Append rows to a table", json!({})),
        tables::add_table_row,
    );
    registry.register_async(
        meta("excel_create_table", "Turn a range into a table", json!({})),
        tables::create_table,
    );
    registry.register_async(
        meta("excel_update_table_row", "Replace the values of a table row", json!({})),
        tables::update_table_row,
    );
    registry.register_async(
        meta("excel_delete_table_row", "Delete a table row", json!({"deleted": false})),
        tables::delete_table_row,
    );
    registry.register_async(
        meta(
            "excel_apply_filter",
            "Filter a table column",
            json!({"filtered": false}),
        ),
        tables::apply_filter,
    );
    registry.register_async(
        meta("excel_clear_filter", "Clear every filter on a table", json!({"cleared": false})),
        tables::clear_filter,
    );
}
