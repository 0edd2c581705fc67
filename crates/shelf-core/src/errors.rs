/// Errors raised by book and explanation sources.
///
/// None of these are retried. The navigator turns a book failure into an
/// aborted render and an explanation failure into fallback text.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("catalog is empty")]
    EmptyCatalog,
    #[error("no explanation for book {0}")]
    MissingExplanation(usize),
    #[error("IO error: {0}")]
    Io(String),
}

impl SourceError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::NotFound(_) => "not_found",
            Self::Status { .. } => "server_error",
            Self::Decode(_) => "decode_error",
            Self::EmptyCatalog => "empty_catalog",
            Self::MissingExplanation(_) => "missing_explanation",
            Self::Io(_) => "io_error",
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => Self::NotFound(body),
            _ => Self::Status { status, body },
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_mapping() {
        assert_eq!(
            SourceError::from_status(404, "missing".into()),
            SourceError::NotFound("missing".into())
        );
        assert!(matches!(
            SourceError::from_status(500, "No data loaded".into()),
            SourceError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(SourceError::EmptyCatalog.error_kind(), "empty_catalog");
        assert_eq!(SourceError::Network("reset".into()).error_kind(), "network_error");
        assert_eq!(SourceError::MissingExplanation(2).error_kind(), "missing_explanation");
    }

    #[test]
    fn display_includes_status() {
        let err = SourceError::Status {
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "server error 502: bad gateway");
    }

    #[test]
    fn json_error_converts_to_decode() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err: SourceError = json_err.into();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
