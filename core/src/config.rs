use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use anyhow::Context as _;
use runprobe_webclient::{parse_url, Endpoint};
use serde::Deserialize;

use crate::testing::VerifyMode;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub server: Endpoint,
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Ask the server to keep the run directory around.
    pub debug: bool,
    pub verbose: bool,
    /// How many copies of the parallel job are submitted at once.
    pub parallel_submits: usize,
    pub verify_mode: VerifyMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            debug: true,
            verbose: false,
            parallel_submits: 10,
            verify_mode: VerifyMode::default(),
        }
    }
}

/// Variables read from the environment, `RUNPROBE_BASE_URL` and `RUNPROBE_API_KEY`.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl Config {
    pub const FILENAME: &str = "runprobe.toml";
    pub const ENV_PREFIX: &str = "RUNPROBE_";

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = std::fs::read_to_string(&filepath)
            .with_context(|| format!("Cannot read config file {:?}", filepath))?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// Reads `explicit` if given, otherwise the nearest `runprobe.toml`.
    /// Falls back to the defaults when neither exists.
    pub fn load(explicit: Option<PathBuf>, cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        match explicit.or_else(|| Self::find_file_in_ancestors(cur_dir)) {
            Some(path) => Self::from_toml_file(path),
            None => {
                log::debug!("No {} found, using defaults", Self::FILENAME);
                Ok(Self::default())
            }
        }
    }

    pub fn with_env(self) -> anyhow::Result<Self> {
        self.with_env_vars(std::env::vars())
    }

    pub fn with_env_vars(
        mut self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> anyhow::Result<Self> {
        let env: EnvOverrides = envy::prefixed(Self::ENV_PREFIX)
            .from_iter(vars)
            .context("Invalid RUNPROBE_* environment variables")?;

        if let Some(url) = env.base_url {
            self.server.base_url = parse_url(&url)?;
        }
        if let Some(key) = env.api_key {
            self.server.api_key = Some(key);
        }
        Ok(self)
    }
}
