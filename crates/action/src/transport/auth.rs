use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::HttpRequest;

/// Authentication schemes an integration can attach to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum RequestAuth {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// API key carried in a named header
    ApiKeyHeader {
        /// Header name
        header: String,
        /// Key value
        key: String,
    },
    /// API key carried as a query parameter
    ApiKeyQuery {
        /// Parameter name
        param: String,
        /// Key value
        key: String,
    },
    /// `Authorization: Basic <base64(user:pass)>`
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },
    /// No authentication
    None,
}

impl RequestAuth {
    /// Creates bearer authentication
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Creates header API key authentication
    pub fn api_key_header(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ApiKeyHeader {
            header: header.into(),
            key: key.into(),
        }
    }

    /// Creates query API key authentication
    pub fn api_key_query(param: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ApiKeyQuery {
            param: param.into(),
            key: key.into(),
        }
    }

    /// Creates basic authentication
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub(crate) fn apply(&self, request: HttpRequest) -> HttpRequest {
        match self {
            Self::Bearer(token) => request.bearer_auth(token),
            Self::ApiKeyHeader { header, key } => request.header(header.clone(), key.clone()),
            Self::ApiKeyQuery { param, key } => request.query_param(param.clone(), key),
            Self::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                request.header("Authorization", format!("Basic {encoded}"))
            }
            Self::None => request,
        }
    }
}

impl fmt::Debug for RequestAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer([REDACTED])"),
            Self::ApiKeyHeader { header, .. } => write!(f, "ApiKeyHeader({header}: [REDACTED])"),
            Self::ApiKeyQuery { param, .. } => write!(f, "ApiKeyQuery({param}=[REDACTED])"),
            Self::Basic { username, .. } => write!(f, "Basic({username}:[REDACTED])"),
            Self::None => f.write_str("None"),
        }
    }
}
