use thiserror::Error;

pub type Result<T> = std::result::Result<T, SqlqubeError>;

#[derive(Debug, Error)]
pub enum SqlqubeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("unknown view: {0}")]
    UnknownView(String),
    #[error("attribute {name} not found in view {view}")]
    UnknownAttribute { view: String, name: String },
    #[error("view {0} is already registered in the schema")]
    DuplicateView(String),
    #[error("relation mismatch: {0}")]
    MismatchedRelation(String),
    #[error("no related views to {0}")]
    DisconnectedJoin(String),
    #[error("inconsistent projection: {0}")]
    InconsistentProjection(String),
    #[error("missing alias: {0}")]
    MissingAlias(String),
}
