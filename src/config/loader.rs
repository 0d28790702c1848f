//! Config file discovery and loading

use super::{parse_config, Config};
use crate::error::{ErrorCode, RelishError, Result};
use directories::ProjectDirs;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "RELISH_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    WorkingDir(PathBuf),
    UserConfigDir(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p)
            | ConfigSource::Environment(p)
            | ConfigSource::WorkingDir(p)
            | ConfigSource::UserConfigDir(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }

    /// Explicitly named files must exist; discovered ones are optional
    fn is_explicit(&self) -> bool {
        matches!(
            self,
            ConfigSource::CommandLine(_) | ConfigSource::Environment(_)
        )
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CommandLine(p) => write!(f, "{} (--config)", p.display()),
            ConfigSource::Environment(p) => write!(f, "{} (${CONFIG_ENV})", p.display()),
            ConfigSource::WorkingDir(p) | ConfigSource::UserConfigDir(p) => {
                write!(f, "{}", p.display())
            }
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Platform config directory, e.g. `~/.config/relishplus` on Linux
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "relishplus", "relishplus").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Resolves the config file in order: `--config`, `$RELISH_CONFIG`,
/// `./config.yml`, then the platform config directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    explicit: Option<PathBuf>,
    env_path: Option<PathBuf>,
    working_dir: PathBuf,
    user_dir: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader reading the real environment
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            env_path: std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            working_dir: PathBuf::from("."),
            user_dir: user_config_dir(),
        }
    }

    pub fn with_env_path(mut self, path: Option<PathBuf>) -> Self {
        self.env_path = path;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_user_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.user_dir = dir;
        self
    }

    fn candidates(&self) -> Vec<ConfigSource> {
        let mut sources = Vec::new();
        if let Some(path) = &self.explicit {
            sources.push(ConfigSource::CommandLine(path.clone()));
        }
        if let Some(path) = &self.env_path {
            sources.push(ConfigSource::Environment(path.clone()));
        }
        sources.push(ConfigSource::WorkingDir(self.working_dir.join(CONFIG_FILE_NAME)));
        if let Some(dir) = &self.user_dir {
            sources.push(ConfigSource::UserConfigDir(dir.join(CONFIG_FILE_NAME)));
        }
        sources
    }

    /// Pick the first applicable source without reading it
    pub async fn resolve(&self) -> Result<ConfigSource> {
        for source in self.candidates() {
            let Some(path) = source.path() else { continue };
            let exists = fs::try_exists(path).await.unwrap_or(false);
            if exists {
                return Ok(source);
            }
            if source.is_explicit() {
                return Err(RelishError::config_with_code(
                    ErrorCode::CONFIG_NOT_FOUND,
                    format!("config file {source} does not exist"),
                )
                .with_path(path));
            }
            debug!("No config at {}", path.display());
        }
        Ok(ConfigSource::Defaults)
    }

    /// Resolve, read, parse and validate
    pub async fn load(&self) -> Result<LoadedConfig> {
        let source = self.resolve().await?;
        let config = match source.path() {
            Some(path) => load_from_path(path).await?,
            None => Config::default(),
        };
        info!("Using configuration from {}", source);
        Ok(LoadedConfig { config, source })
    }
}

/// Read and validate one config file
pub async fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        RelishError::config_with_code(ErrorCode::CONFIG_IO_ERROR, "failed to read config file")
            .with_path(path)
            .with_source(e)
    })?;
    let config = parse_config(&content).map_err(|e| e.with_path(path))?;
    config.validate().map_err(|e| e.with_path(path))?;
    Ok(config)
}
