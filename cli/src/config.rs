//! Configuration file handling for the pairsap CLI
//!
//! Values come from the JSON config file (if any) and are then overridden by
//! command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use stealth::{RoleAssignment, SchemeVariant, StealthConfig};
use tracing::debug;

use crate::GlobalArgs;

/// Directory under the user config directory
const CONFIG_DIR: &str = "pairsap";
const CONFIG_FILE: &str = "config.json";

/// `<config dir>/pairsap/config.json`, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load a config file; a missing file yields the defaults unless `required`
pub fn load_config(path: &Path, required: bool) -> Result<StealthConfig> {
    if !path.exists() {
        if required {
            bail!("Config file not found at {}", path.display());
        }
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(StealthConfig::default());
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = StealthConfig::from_json(&json)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    Ok(config)
}

/// Save a config file, creating parent directories as needed
pub fn save_config(config: &StealthConfig, path: &Path) -> Result<()> {
    config.validate().context("Refusing to save an invalid config")?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create config directory")?;
    }

    let json = config.to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

/// Apply command-line flags on top of a loaded config
pub fn apply_overrides(mut config: StealthConfig, args: &GlobalArgs) -> Result<StealthConfig> {
    if let Some(variant) = &args.variant {
        config.variant = variant.parse::<SchemeVariant>()?;
    }
    if let Some(roles) = &args.roles {
        config.roles = roles.parse::<RoleAssignment>()?;
    }
    if let Some(workers) = args.workers {
        config.scan.workers = workers;
    }
    if args.no_view_tag {
        config.scan.use_view_tag = false;
    }

    config.validate().context("Invalid settings")?;
    Ok(config)
}

/// Apply a per-command `--pool-size` and re-check the result
pub fn with_pool_size(config: &StealthConfig, pool_size: Option<usize>) -> Result<StealthConfig> {
    let mut config = *config;
    if let Some(pool_size) = pool_size {
        config.pool_size = pool_size;
        config.validate().context("Invalid --pool-size")?;
    }
    Ok(config)
}

/// Effective configuration for this invocation
pub fn resolve(args: &GlobalArgs) -> Result<StealthConfig> {
    let loaded = match (&args.config, default_config_path()) {
        (Some(path), _) => load_config(path, true)?,
        (None, Some(path)) => load_config(&path, false)?,
        (None, None) => StealthConfig::default(),
    };

    apply_overrides(loaded, args)
}
