use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON, or a field of the wrong type.
    #[error("settings file is not valid: {0}")]
    Json(#[from] serde_json::Error),
    /// Merged settings the browser cannot start with.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_field_type_is_a_json_error() {
        let err = serde_json::from_str::<crate::ShelfSettings>(r#"{"navigator": {"seed": "x"}}"#)
            .map_err(SettingsError::from)
            .unwrap_err();
        assert!(err.to_string().starts_with("settings file is not valid"));
    }

    #[test]
    fn invalid_value_display() {
        let err = SettingsError::InvalidValue("source.baseUrl is required".to_string());
        assert_eq!(
            err.to_string(),
            "invalid settings value: source.baseUrl is required"
        );
    }
}
