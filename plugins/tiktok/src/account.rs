//! Profile and posting-capability lookups.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client;

/// Fields across the `user.info.basic`, `user.info.profile` and
/// `user.info.stats` scopes, with their empty values.
const USER_FIELDS: [(&str, fn() -> Value); 13] = [
    ("open_id", || json!("")),
    ("union_id", || json!("")),
    ("avatar_url", || json!("")),
    ("avatar_url_100", || json!("")),
    ("avatar_large_url", || json!("")),
    ("display_name", || json!("")),
    ("bio_description", || json!("")),
    ("profile_deep_link", || json!("")),
    ("is_verified", || json!(false)),
    ("follower_count", || json!(0)),
    ("following_count", || json!(0)),
    ("likes_count", || json!(0)),
    ("video_count", || json!(0)),
];

const CREATOR_FIELDS: [(&str, fn() -> Value); 8] = [
    ("creator_avatar_url", || json!("")),
    ("creator_username", || json!("")),
    ("creator_nickname", || json!("")),
    ("privacy_level_options", || json!([])),
    ("comment_disabled", || json!(false)),
    ("duet_disabled", || json!(false)),
    ("stitch_disabled", || json!(false)),
    ("max_video_post_duration_sec", || json!(600)),
];

/// Copy `fields` out of `source`, substituting each field's empty value.
pub(crate) fn normalize(source: &Value, fields: &[(&str, fn() -> Value)]) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(key, empty)| {
            let value = source.get(*key).filter(|v| !v.is_null()).cloned();
            ((*key).to_owned(), value.unwrap_or_else(empty))
        })
        .collect();
    Value::Object(map)
}

pub(crate) async fn get_user_info(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let names: Vec<&str> = USER_FIELDS.iter().map(|(k, _)| *k).collect();
    let request = client::request(&ctx, RequestMethod::Get, "user/info/")?
        .query_param("fields", names.join(","));
    let data = client::call(&ctx, request).await?;

    let user = data.get("user").unwrap_or(&data);
    Ok(normalize(user, &USER_FIELDS))
}

pub(crate) async fn get_creator_info(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let data = client::post(&ctx, "post/publish/creator_info/query/", json!({})).await?;
    Ok(normalize(&data, &CREATOR_FIELDS))
}
