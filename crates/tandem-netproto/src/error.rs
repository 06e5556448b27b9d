use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid role: {0:?}")]
    InvalidRole(String),
    #[error("invalid foot: {0:?}")]
    InvalidFoot(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
