use std::path::Path;

use config::{Config, ConfigError, FileFormat};
use serde::{Deserialize, Serialize};

use super::ServiceErrorPolicy;

/// settings for a calendar refresh. every field is optional in a
/// configuration file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RefreshConfig {
    /// expand services on the rayon thread pool
    pub parallelize: bool,
    /// show a progress bar while expanding
    pub progress: bool,
    pub on_service_error: ServiceErrorPolicy,
}

impl RefreshConfig {
    /// reads a refresh configuration from a `.toml` or `.json` file.
    pub fn from_file(path: &Path) -> Result<RefreshConfig, ConfigError> {
        let format = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => {
                return Err(ConfigError::Message(format!(
                    "unsupported file type: {}",
                    path.display()
                )))
            }
        };
        let source = config::File::from(path).format(format);
        Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize::<RefreshConfig>()
    }
}
