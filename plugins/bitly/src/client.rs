use nebula_action::RequestMethod;
use nebula_action::prelude::*;
use url::Url;

use crate::{CATEGORY, DEFAULT_BASE_URL};

/// Canonical `domain/hash` form of a bitlink.
///
/// ```
/// use nebula_bitly::normalize_bitlink;
///
/// assert_eq!(normalize_bitlink("https://bit.ly/abc"), "bit.ly/abc");
/// assert_eq!(normalize_bitlink("abc"), "bit.ly/abc");
/// ```
pub fn normalize_bitlink(bitlink: &str) -> String {
    if bitlink.starts_with("http://") || bitlink.starts_with("https://") {
        if let Ok(url) = Url::parse(bitlink) {
            let host = url.host_str().unwrap_or_default();
            let authority = match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_owned(),
            };
            let path = match url.path() {
                "/" => "",
                path => path,
            };
            return format!("{authority}{path}");
        }
        return bitlink.to_owned();
    }
    if bitlink.contains('/') {
        bitlink.to_owned()
    } else {
        format!("bit.ly/{bitlink}")
    }
}

/// Path segment for the required `bitlink` input, normalised and encoded.
pub(crate) fn bitlink_segment(input: &ActionInput) -> Result<String, ActionError> {
    Ok(encode_segment(&normalize_bitlink(input.require_str("bitlink")?)))
}

pub(crate) fn request(
    ctx: &ExecutionContext,
    method: RequestMethod,
    path: &str,
) -> Result<HttpRequest, ActionError> {
    let token = ctx.bearer_token()?;
    let url = format!("{}/{path}", ctx.base_url(CATEGORY, DEFAULT_BASE_URL));
    Ok(HttpRequest::new(method, url).bearer_auth(token))
}

/// Copy every non-empty input in `keys` into `body` under the same name.
pub(crate) fn copy_present(input: &ActionInput, body: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(value) = input.non_empty(key) {
            body.insert((*key).to_owned(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("https://bit.ly/abc123", "bit.ly/abc123")]
    #[case("http://j.mp/xyz", "j.mp/xyz")]
    #[case("https://bit.ly", "bit.ly")]
    #[case("custom.link/promo", "custom.link/promo")]
    #[case("abc123", "bit.ly/abc123")]
    fn bitlinks_normalise_to_domain_and_hash(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_bitlink(raw), expected);
    }
}
