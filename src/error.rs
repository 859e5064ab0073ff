use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("HMC request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HMC returned HTTP {status} for {path}")]
    Status {
        status: reqwest::StatusCode,
        path: String,
    },

    #[error("HMC logon failed: {0}")]
    Logon(String),

    #[error("malformed HMC response: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed HMC response: {0}")]
    Malformed(String),

    #[error("JSON encoding: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
