//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use click_server::{AppConfig, Mode};

use crate::output::Output;

/// Config file names searched from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["click.toml", ".click.toml", "click.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Application configuration.
    pub config: AppConfig,
    /// File the configuration came from; `None` for the built-in routes.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load the configuration, falling back to the example routes.
    pub fn load(config_path: Option<&str>, mode: Option<Mode>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => (AppConfig::load(path)?, Some(PathBuf::from(path))),
            None => match Self::find_config(&cwd) {
                Some(path) => (AppConfig::load(&path)?, Some(path)),
                None => (click_examples::default_config(), None),
            },
        };
        if let Some(mode) = mode {
            config.mode = mode;
        }

        if let Some(path) = &config_path {
            output.debug(&format!("Using config: {}", path.display()));
        } else {
            output.debug("No config file found, using the example routes");
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find a config file in the directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        start.ancestors().find_map(|dir| {
            CONFIG_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|path| path.exists())
        })
    }

    /// Path `config --init` writes to.
    pub fn default_config_path(&self) -> PathBuf {
        self.cwd.join(CONFIG_NAMES[0])
    }
}
