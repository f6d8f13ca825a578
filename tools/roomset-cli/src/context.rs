//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, searched in this order in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["roomset.toml", ".roomset.toml", "roomset.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = match config_path {
            Some(path) => CliConfig::load(path)?,
            None => find_config(&cwd).unwrap_or_default(),
        };

        Ok(Self { config, output, cwd })
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.cwd.join(path)
        }
    }

    /// Directory that receives order files.
    pub fn orders_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.orders.dir)
    }
}

/// First config file in `start` or its ancestors.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    })
}

fn find_config(start: &Path) -> Option<CliConfig> {
    let path = find_config_file(start)?;
    match CliConfig::load(path.to_str()?) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_in_parent() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("roomset.toml"), "[engine]\nfallback_floor = 250\n").unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, root.path().join("roomset.toml"));
        assert_eq!(find_config(&nested).unwrap().engine.fallback_floor, 250);
    }

    #[test]
    fn test_unparseable_config_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("roomset.toml"), "not = [valid").unwrap();
        assert!(find_config(root.path()).is_none());
    }
}
