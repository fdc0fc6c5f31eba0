use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;

use super::{HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError};
use crate::config::ClientConfig;

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Creates a transport with default settings
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(&ClientConfig::default())
    }

    /// Creates a transport honouring timeout and user agent from `config`
    pub fn with_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::BuildError(format!("Failed to build client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client
    pub fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.full_url()?;
        let mut builder = self
            .client
            .request(http::Method::from(request.method), url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if request.method.can_have_body() {
            match &request.body {
                Some(RequestBody::Json(json)) => {
                    let bytes = serde_json::to_vec(json).map_err(|e| {
                        TransportError::BuildError(format!("body serialization failed: {e}"))
                    })?;
                    if request.get_header("content-type").is_none() {
                        builder = builder.header("Content-Type", "application/json");
                    }
                    builder = builder.body(bytes);
                }
                Some(RequestBody::Raw {
                    bytes,
                    content_type,
                }) => {
                    if request.get_header("content-type").is_none() {
                        builder = builder.header("Content-Type", content_type.as_str());
                    }
                    builder = builder.body(bytes.clone());
                }
                None => {}
            }
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned())))
            .collect();
        let bytes = response.bytes().await?;

        Ok(HttpResponse::from_bytes(status, headers, &bytes))
    }
}
