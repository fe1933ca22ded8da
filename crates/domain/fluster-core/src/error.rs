#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed stats payload: {0}")]
    Stats(#[source] serde_json::Error),
    #[error("malformed server payload: {0}")]
    Server(#[source] serde_json::Error),
    #[error("unknown view '{0}'")]
    UnknownView(String),
}
