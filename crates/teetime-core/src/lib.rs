mod app_config;
mod clubs;
mod config;
mod records;

pub use app_config::AppConfig;
pub use clubs::{load_clubs, Club, ClubDirectory, ClubEntry, Sector};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{ConsolidatedRecord, SourceId, TeeTimeRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read club directory at {path}: {source}")]
    ClubsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse club directory at {path}: {reason}")]
    ClubsFileParse { path: String, reason: String },

    #[error("config validation error: {0}")]
    Validation(String),
}
