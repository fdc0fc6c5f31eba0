//! Signed calls against one AWS service.

use std::time::SystemTime;

use aws_credential_types::Credentials as AwsCredentials;
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use nebula_action::prelude::*;
use nebula_action::{ErrorKind, RequestBody, RequestMethod};

use crate::CATEGORY;

const DEFAULT_REGION: &str = "us-east-1";
const PROVIDER_NAME: &str = "nebula-aws";

/// Wire protocol spoken by a service.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Protocol {
    /// Path-routed REST with JSON bodies.
    RestJson,
    /// Single endpoint, operation named in `X-Amz-Target`.
    Json {
        content_type: &'static str,
        target_prefix: &'static str,
    },
}

/// Static description of one AWS service.
#[derive(Debug)]
pub(crate) struct Service {
    /// Signing name, also the endpoint host prefix.
    pub name: &'static str,
    pub protocol: Protocol,
}

pub(crate) const SECURITY_HUB: Service = Service {
    name: "securityhub",
    protocol: Protocol::RestJson,
};

pub(crate) const GUARDDUTY: Service = Service {
    name: "guardduty",
    protocol: Protocol::RestJson,
};

pub(crate) const CLOUDWATCH: Service = Service {
    name: "monitoring",
    protocol: Protocol::Json {
        content_type: "application/x-amz-json-1.0",
        target_prefix: "GraniteServiceVersion20100801",
    },
};

pub(crate) const LOGS: Service = Service {
    name: "logs",
    protocol: Protocol::Json {
        content_type: "application/x-amz-json-1.1",
        target_prefix: "Logs_20140328",
    },
};

pub(crate) const CLOUDTRAIL: Service = Service {
    name: "cloudtrail",
    protocol: Protocol::Json {
        content_type: "application/x-amz-json-1.1",
        target_prefix: "com.amazonaws.cloudtrail.v20131101.CloudTrail_20131101",
    },
};

/// A signed client bound to one service and one invocation.
pub(crate) struct AwsClient<'a> {
    ctx: &'a ExecutionContext,
    service: &'static Service,
    credentials: AwsCredentials,
    region: String,
    endpoint: String,
}

impl<'a> AwsClient<'a> {
    /// Read keys and region from the context credentials.
    pub fn new(ctx: &'a ExecutionContext, service: &'static Service) -> Result<Self, ActionError> {
        let credentials = AwsCredentials::new(
            ctx.credential("aws_access_key_id")?,
            ctx.credential("aws_secret_access_key")?,
            ctx.credentials()
                .get("aws_session_token")
                .filter(|t| !t.is_empty())
                .map(str::to_owned),
            None,
            PROVIDER_NAME,
        );
        let region = ctx
            .credentials()
            .get("aws_region")
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REGION)
            .to_string();
        let default_endpoint = format!("https://{}.{region}.amazonaws.com", service.name);
        let endpoint = ctx.base_url(CATEGORY, &default_endpoint);

        Ok(Self {
            ctx,
            service,
            credentials,
            region,
            endpoint,
        })
    }

    /// Invoke a JSON-protocol operation.
    pub async fn call(&self, operation: &str, body: Value) -> Result<Value, ActionError> {
        let Protocol::Json {
            content_type,
            target_prefix,
        } = self.service.protocol
        else {
            return Err(ActionError::from_message(format!(
                "{} is not a JSON-protocol service",
                self.service.name
            )));
        };

        let request = HttpRequest::post(format!("{}/", self.endpoint))
            .header("Content-Type", content_type)
            .header("X-Amz-Target", format!("{target_prefix}.{operation}"))
            .raw(Bytes::from(body.to_string()), content_type);

        self.dispatch(request).await
    }

    /// Invoke a REST operation; `path` must already be encoded.
    pub async fn rest(
        &self,
        method: RequestMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ActionError> {
        let mut request = HttpRequest::new(method, format!("{}{path}", self.endpoint));
        for (name, value) in query {
            request = request.query_param(*name, value);
        }
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .raw(Bytes::from(body.to_string()), "application/json");
        }

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<Value, ActionError> {
        let request = sign_request(
            request,
            &self.credentials,
            &self.region,
            self.service.name,
            SystemTime::now(),
        )?;
        let response = self.ctx.send(request).await?;
        if response.is_success() {
            return Ok(response.body);
        }
        Err(service_error(&response))
    }
}

/// Attach the SigV4 headers (`x-amz-date`, the session token and
/// `Authorization`) computed over the request as it will go on the wire.
pub(crate) fn sign_request(
    request: HttpRequest,
    credentials: &AwsCredentials,
    region: &str,
    service: &str,
    time: SystemTime,
) -> Result<HttpRequest, ActionError> {
    let signing_error =
        |e: String| ActionError::api(ErrorKind::AuthError, format!("failed to sign {service} request: {e}"));

    let identity = credentials.clone().into();
    let params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(service)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| signing_error(e.to_string()))?
        .into();

    let url = request.full_url()?;
    let payload: Vec<u8> = match &request.body {
        Some(RequestBody::Raw { bytes, .. }) => bytes.to_vec(),
        Some(RequestBody::Json(value)) => value.to_string().into_bytes(),
        None => Vec::new(),
    };
    let signable = SignableRequest::new(
        request.method.as_str(),
        url.as_str(),
        request.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        SignableBody::Bytes(&payload),
    )
    .map_err(|e| signing_error(e.to_string()))?;

    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| signing_error(e.to_string()))?
        .into_parts();

    tracing::trace!(service, region, "signed request");

    Ok(instructions
        .headers()
        .fold(request, |request, (name, value)| request.header(name, value)))
}

/// `{error, error_code}` from an AWS error response.
///
/// JSON protocols put the code in `__type` (`"ns#Code"`), REST services in
/// `x-amzn-ErrorType` (`"Code:http://..."`).
fn service_error(response: &HttpResponse) -> ActionError {
    let body = &response.body;
    let code = body
        .get("__type")
        .and_then(Value::as_str)
        .map(|t| t.rsplit('#').next().unwrap_or(t))
        .or_else(|| {
            response
                .get_header("x-amzn-ErrorType")
                .map(|t| t.split(':').next().unwrap_or(t))
        })
        .or_else(|| body.get("code").and_then(Value::as_str))
        .or_else(|| body.get("Code").and_then(Value::as_str))
        .filter(|c| !c.is_empty());

    let message = ["message", "Message"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .map_or_else(|| format!("HTTP {}", response.status), str::to_owned);

    let err = ActionError::http(response.status, message).with_retry_after(response.retry_after());
    match code {
        Some(code) => err.with_code(code),
        None => err,
    }
}

/// Parse an ISO 8601 timestamp; a missing offset means UTC.
pub(crate) fn parse_time(field: &str, raw: &str) -> Result<DateTime<Utc>, ActionError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|t| t.and_utc()))
        .map_err(|_| ActionError::validation(format!("{field} must be an ISO 8601 timestamp")))
}

/// Epoch seconds for JSON-protocol timestamp members.
pub(crate) fn epoch_seconds(input: &ActionInput, field: &str) -> Result<Option<Value>, ActionError> {
    input
        .opt_str(field)
        .map(|raw| parse_time(field, raw).map(|t| json!(t.timestamp())))
        .transpose()
}

/// Epoch milliseconds (CloudWatch Logs).
pub(crate) fn epoch_millis(input: &ActionInput, field: &str) -> Result<Option<Value>, ActionError> {
    input
        .opt_str(field)
        .map(|raw| parse_time(field, raw).map(|t| json!(t.timestamp_millis())))
        .transpose()
}

/// Request body under construction; `None` values are skipped.
#[derive(Debug, Default)]
pub(crate) struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn opt(mut self, key: &str, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}

/// Field of a response, `null` when absent.
pub(crate) fn field(body: &Value, key: &str) -> Value {
    body.get(key).cloned().unwrap_or(Value::Null)
}

/// Array field of a response, `[]` when absent.
pub(crate) fn list(body: &Value, key: &str) -> Value {
    body.get(key)
        .filter(|v| v.is_array())
        .cloned()
        .unwrap_or_else(|| json!([]))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use pretty_assertions::assert_eq;

    use super::*;

    fn example_credentials(session_token: Option<&str>) -> AwsCredentials {
        AwsCredentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            session_token.map(str::to_owned),
            None,
            PROVIDER_NAME,
        )
    }

    // IAM ListUsers from the SigV4 documentation, 2015-08-30T12:36:00Z.
    #[test]
    fn signature_matches_published_example() {
        let time = UNIX_EPOCH + Duration::from_secs(1_440_938_160);
        let request = HttpRequest::get("https://iam.amazonaws.com/")
            .query_param("Action", "ListUsers")
            .query_param("Version", "2010-05-08")
            .header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8");

        let signed = sign_request(request, &example_credentials(None), "us-east-1", "iam", time).unwrap();

        assert_eq!(signed.get_header("x-amz-date"), Some("20150830T123600Z"));
        assert_eq!(
            signed.get_header("authorization"),
            Some(
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
                 SignedHeaders=content-type;host;x-amz-date, \
                 Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
            )
        );
    }

    #[test]
    fn session_token_is_attached_and_signed() {
        let time = UNIX_EPOCH + Duration::from_secs(1_704_067_200);
        let signed = sign_request(
            HttpRequest::post("https://logs.eu-west-1.amazonaws.com/")
                .header("X-Amz-Target", "Logs_20140328.DescribeLogGroups")
                .raw(Bytes::from_static(b"{}"), "application/x-amz-json-1.1"),
            &example_credentials(Some("FQoGZXIvYXdzEXAMPLE")),
            "eu-west-1",
            "logs",
            time,
        )
        .unwrap();

        assert_eq!(signed.get_header("x-amz-security-token"), Some("FQoGZXIvYXdzEXAMPLE"));
        let auth = signed.get_header("authorization").unwrap();
        assert!(auth.contains("/20240101/eu-west-1/logs/aws4_request"));
        assert!(auth.contains("x-amz-security-token"));
        assert!(auth.contains("x-amz-target"));
    }

    #[test]
    fn json_protocol_error_code() {
        let response = HttpResponse::new(
            400,
            json!({"__type": "com.amazonaws.logs#ResourceNotFoundException", "message": "The specified log group does not exist."}),
        );
        let err = service_error(&response);
        assert_eq!(err.code(), Some("ResourceNotFoundException"));
        assert_eq!(err.message(), "The specified log group does not exist.");
    }

    #[test]
    fn rest_error_code_from_header() {
        let response = HttpResponse::new(403, json!({"Message": "not subscribed"}))
            .with_header("x-amzn-ErrorType", "InvalidAccessException:http://internal.amazon.com/");
        let err = service_error(&response);
        assert_eq!(err.code(), Some("InvalidAccessException"));
        assert_eq!(err.message(), "not subscribed");
    }

    #[test]
    fn timestamps() {
        let t = parse_time("start_time", "2024-03-01T10:00:00Z").unwrap();
        assert_eq!(t.timestamp(), 1_709_287_200);
        assert_eq!(parse_time("start_time", "2024-03-01T10:00:00").unwrap(), t);
        assert_eq!(
            parse_time("start_time", "yesterday").unwrap_err().to_string(),
            "start_time must be an ISO 8601 timestamp"
        );
    }
}
