use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid route parameter '{key}': {reason}")]
    InvalidRouteParam { key: String, reason: String },
    #[error("unknown activity type: {0}")]
    UnknownActivityType(String),
}
