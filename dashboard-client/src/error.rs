use thiserror::Error;

use crate::dom::NodeId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("node {0:?} is not part of the document")]
    DetachedNode(NodeId),

    #[error("unknown monitoring action '{0}'")]
    UnknownAction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
