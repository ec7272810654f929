#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing required environment variable: {var}")]
    MissingEnv { var: &'static str },

    #[error("Invalid value for {var} ({value:?}): {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),
}
