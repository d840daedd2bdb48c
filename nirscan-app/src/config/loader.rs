//! Device configuration loader

use std::fs;
use std::path::{Path, PathBuf};

use nirscan_core::config::{ConfigError, DeviceConfig};
use tracing::{debug, info};

/// Embedded default configuration (compiled into the binary)
const EMBEDDED_CONFIG: &str = include_str!("../../device.toml");

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "NIRSCAN_CONFIG";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Explicitly named file could not be read
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// TOML syntax or type error
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Values rejected by validation
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// First command-line argument
    Argument(PathBuf),
    /// `NIRSCAN_CONFIG`
    Environment(PathBuf),
    /// Built-in default
    Embedded,
}

impl ConfigSource {
    /// Pick a source: argument first, then environment, then embedded
    pub fn select(arg: Option<String>, env: Option<String>) -> Self {
        match (arg, env) {
            (Some(path), _) => ConfigSource::Argument(expand_home(&path)),
            (None, Some(path)) if !path.is_empty() => ConfigSource::Environment(expand_home(&path)),
            _ => ConfigSource::Embedded,
        }
    }
}

/// Expand a leading `~/` against `$HOME`
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return Path::new(&home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse and validate configuration text
///
/// Path-valued fields have `~/` expanded.
pub fn parse_config(text: &str) -> Result<DeviceConfig, LoadError> {
    let mut config: DeviceConfig = toml::from_str(text)?;
    config.validate()?;

    config.scan.artifact_dir = expand_str(&config.scan.artifact_dir);
    config.scan.program = expand_str(&config.scan.program);
    config.scan.args = config.scan.args.iter().map(|a| expand_str(a)).collect();
    config.model.path = expand_str(&config.model.path);
    Ok(config)
}

fn expand_str(s: &str) -> String {
    expand_home(s).to_string_lossy().into_owned()
}

/// Load configuration from the selected source
pub fn load_config(source: &ConfigSource) -> Result<DeviceConfig, LoadError> {
    let config = match source {
        ConfigSource::Argument(path) | ConfigSource::Environment(path) => {
            let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            parse_config(&text)?
        }
        ConfigSource::Embedded => parse_config(EMBEDDED_CONFIG)?,
    };

    info!("Configuration loaded from {:?}, backend {:?}", source, config.backend);
    debug!("{:?}", config);
    Ok(config)
}
