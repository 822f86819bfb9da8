mod app_config;
mod config;
pub mod search;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use search::{
    load_search_config, CvsSearch, JeffersonSearch, RiteAidSearch, SearchConfig,
    DEFAULT_CVS_URL, DEFAULT_JEFFERSON_URL, DEFAULT_RITE_AID_URL,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read search file {path}: {source}")]
    SearchFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse search file: {0}")]
    SearchFileParse(#[source] serde_yaml::Error),

    #[error("search config validation failed: {0}")]
    Validation(String),
}
