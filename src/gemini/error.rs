use thiserror::Error;

/// Marker the endpoint uses when the key's project or model is unknown
const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

/// Failure of a single generation call
#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    #[error("API key not found. Please select a valid API key.")]
    MissingCredential,

    #[error("Model failed to generate an image. Please try a more specific prompt.")]
    NoImage {
        /// Finish or block reason reported by the endpoint, if any
        reason: Option<String>,
    },

    #[error("{message}")]
    Endpoint {
        status: u16,
        /// Status string from the error envelope (e.g. "NOT_FOUND")
        code: Option<String>,
        message: String,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// The three reactions the UI distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Prompt for a credential before retrying
    Credential,
    /// Banner; the displayed image stays as it was
    NoImage,
    /// Banner with the endpoint's message
    Endpoint,
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerateError::MissingCredential => ErrorKind::Credential,
            GenerateError::NoImage { .. } => ErrorKind::NoImage,
            GenerateError::Endpoint { .. }
            | GenerateError::Transport(_)
            | GenerateError::MalformedResponse(_) => ErrorKind::Endpoint,
        }
    }

    /// True when the key should be re-selected before trying again
    pub fn requires_credential_reselect(&self) -> bool {
        match self {
            GenerateError::MissingCredential => true,
            GenerateError::Endpoint {
                status,
                code,
                message,
            } => {
                *status == 404
                    || code.as_deref() == Some("NOT_FOUND")
                    || message.contains(ENTITY_NOT_FOUND)
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        GenerateError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(status: u16, code: Option<&str>, message: &str) -> GenerateError {
        GenerateError::Endpoint {
            status,
            code: code.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_three_way_kinds() {
        assert_eq!(GenerateError::MissingCredential.kind(), ErrorKind::Credential);
        assert_eq!(GenerateError::NoImage { reason: None }.kind(), ErrorKind::NoImage);
        assert_eq!(endpoint(500, None, "boom").kind(), ErrorKind::Endpoint);
        assert_eq!(GenerateError::Transport("reset".into()).kind(), ErrorKind::Endpoint);
    }

    #[test]
    fn test_not_found_requires_reselect() {
        assert!(endpoint(404, Some("NOT_FOUND"), "Requested entity was not found.").requires_credential_reselect());
        assert!(endpoint(400, None, "Requested entity was not found.").requires_credential_reselect());
        assert!(!endpoint(429, Some("RESOURCE_EXHAUSTED"), "quota").requires_credential_reselect());
        assert!(!GenerateError::NoImage { reason: None }.requires_credential_reselect());
    }

    #[test]
    fn test_endpoint_message_is_shown_verbatim() {
        let err = endpoint(500, None, "Internal error encountered.");
        assert_eq!(err.to_string(), "Internal error encountered.");
    }
}
