use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{graph_error, request};

const UNKNOWN: &str = "UNKNOWN";

/// Registration status and quality rating of a business number.
pub(crate) async fn get_phone_number_health(
    input: ActionInput,
    ctx: ExecutionContext,
) -> Result<Value, ActionError> {
    let phone_number_id = validate::identifier(&input, "phone_number_id")?;
    let req = request(&ctx, RequestMethod::Get, phone_number_id)?
        .query_param("fields", "status,quality_rating");
    let response = ctx.fetch(req).await?;

    let Some(status) = response.get("status").filter(|s| !s.is_null()) else {
        return Err(ActionError::vendor(graph_error(&response), Map::new()));
    };
    Ok(json!({
        "status": status,
        "quality_rating": response.get("quality_rating").cloned().unwrap_or_else(|| json!(UNKNOWN)),
    }))
}
