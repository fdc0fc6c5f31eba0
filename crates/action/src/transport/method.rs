use serde::{Deserialize, Serialize};

/// HTTP request methods used by integrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    /// GET method for retrieving resources
    #[default]
    Get,
    /// POST method for creating resources
    Post,
    /// PUT method for replacing resources or uploading bytes
    Put,
    /// PATCH method for partial updates
    Patch,
    /// DELETE method for removing resources
    Delete,
}

impl RequestMethod {
    /// Checks if this method can have a request body
    pub fn can_have_body(&self) -> bool {
        !matches!(self, Self::Get)
    }

    /// Checks if the method is safe (doesn't modify the server state)
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get)
    }

    /// Returns the string representation of the method in uppercase
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RequestMethod> for http::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => Self::GET,
            RequestMethod::Post => Self::POST,
            RequestMethod::Put => Self::PUT,
            RequestMethod::Patch => Self::PATCH,
            RequestMethod::Delete => Self::DELETE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_is_bodyless() {
        assert!(!RequestMethod::Get.can_have_body());
        assert!(RequestMethod::Post.can_have_body());
        assert!(RequestMethod::Delete.can_have_body());
    }

    #[test]
    fn serializes_uppercase() {
        let json = serde_json::to_string(&RequestMethod::Patch).unwrap();
        assert_eq!(json, "\"PATCH\"");
        assert_eq!(http::Method::from(RequestMethod::Put), http::Method::PUT);
    }
}
