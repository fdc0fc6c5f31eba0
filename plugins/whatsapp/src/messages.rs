//! Text, template and media messages.

use nebula_action::prelude::*;

use crate::client::{recipient, send_message};

/// Media kinds that carry a caption.
const CAPTIONED: [&str; 3] = ["image", "video", "document"];

const MEDIA_TYPES: [&str; 5] = ["image", "video", "document", "audio", "sticker"];

pub(crate) async fn send_text(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let to = recipient(&input)?;
    let body = input.require_str("message")?;

    let mut payload = Map::new();
    payload.insert("to".into(), json!(to));
    payload.insert("type".into(), json!("text"));
    payload.insert("text".into(), json!({ "body": body }));
    send_message(&ctx, &input, payload).await
}

/// Template with positional body parameters.
pub(crate) async fn send_template(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let to = recipient(&input)?;
    let name = input.require_str("template_name")?;

    let mut template = Map::new();
    template.insert("name".into(), json!(name));
    template.insert(
        "language".into(),
        json!({ "code": input.str_or("language_code", "en") }),
    );
    if let Some(params) = input.opt_str_list("parameters").filter(|p| !p.is_empty()) {
        let parameters: Vec<Value> = params
            .into_iter()
            .map(|text| json!({ "type": "text", "text": text }))
            .collect();
        template.insert(
            "components".into(),
            json!([{ "type": "body", "parameters": parameters }]),
        );
    }

    let mut payload = Map::new();
    payload.insert("to".into(), json!(to));
    payload.insert("type".into(), json!("template"));
    payload.insert("template".into(), Value::Object(template));
    send_message(&ctx, &input, payload).await
}

pub(crate) async fn send_media(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let to = recipient(&input)?;
    let media_type = input.require_str("media_type")?;
    if !MEDIA_TYPES.contains(&media_type) {
        return Err(ActionError::validation(format!(
            "media_type must be one of: {}",
            MEDIA_TYPES.join(", ")
        )));
    }
    let link = input.require_str("media_url")?;
    if !link.starts_with("https://") {
        return Err(ActionError::validation(
            "Invalid media URL. Must be a publicly accessible HTTPS URL.",
        ));
    }

    let mut media = Map::new();
    media.insert("link".into(), json!(link));
    if media_type == "document"
        && let Some(filename) = input.opt_str("filename")
    {
        media.insert("filename".into(), json!(filename));
    }
    if CAPTIONED.contains(&media_type)
        && let Some(caption) = input.opt_str("caption")
    {
        media.insert("caption".into(), json!(caption));
    }

    let mut payload = Map::new();
    payload.insert("to".into(), json!(to));
    payload.insert("type".into(), json!(media_type));
    payload.insert(media_type.to_owned(), Value::Object(media));
    send_message(&ctx, &input, payload).await
}
