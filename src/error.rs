//! Error type shared by the DOM and request helpers.

/// Errors surfaced by selections and requests.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never completed (connection refused, CORS rejection, aborted, ...)
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a status outside 200-299
    #[error("{0}")]
    Status(u16),
    /// A successful response whose body is not valid JSON
    #[error("invalid JSON response: {0}")]
    Parse(#[from] serde_json::Error),
    /// The payload could not be form-encoded
    #[error("cannot encode request payload: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    /// A selector the platform refused to parse
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
    /// Any other failure reported by the DOM
    #[error("DOM error: {0}")]
    Dom(String),
}

impl Error {
    /// The HTTP status carried by a [`Error::Status`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Log a failure of a chained operation instead of interrupting the chain.
pub(crate) fn report(operation: &str, result: Result<()>) {
    if let Err(err) = result {
        tracing::error!(operation, error = %err, "DOM operation failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_code_only() {
        let err = Error::Status(404);
        assert_eq!(err.to_string(), "404");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn parse_error_converts_from_serde() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(err.status(), None);
    }
}
