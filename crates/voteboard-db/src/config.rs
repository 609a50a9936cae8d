use std::path::PathBuf;

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::error::{VoteboardError, VoteboardResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteboardConfig {
    pub database_file: PathBuf,
    pub rest: RestConfig,
}

impl VoteboardConfig {
    pub fn load(path: Option<PathBuf>) -> VoteboardResult<Self> {
        let mut settings = config::Config::builder();
        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path));
        } else if let Some(home) = home_dir() {
            let default = home.join(".voteboard").join("config.yaml");
            if default.exists() {
                settings = settings.add_source(config::File::from(default));
            }
        }
        settings = settings.add_source(
            config::Environment::with_prefix("VOTEBOARD")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );
        let cfg = settings
            .build()
            .map_err(|err| VoteboardError::Configuration(err.to_string()))?;
        cfg.try_deserialize()
            .map_err(|err| VoteboardError::Configuration(err.to_string()))
    }
}

impl Default for VoteboardConfig {
    fn default() -> Self {
        let database_file = home_dir()
            .map(|dir| dir.join(".voteboard").join("features.json"))
            .unwrap_or_else(|| PathBuf::from("./data/features.json"));
        Self {
            database_file,
            rest: RestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    pub bind_addr: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8088".to_string(),
            cors_allowed_origins: vec![],
        }
    }
}
