//! `vanish init`: configuration file generation.

use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::config::VanishConfig;
use crate::log;

/// Write the commented template to `dir/config_name`.
///
/// An existing file is only replaced with `force`.
pub fn write_config(dir: &Path, config_name: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(config_name);
    if path.exists() && !force {
        bail!(
            "Config file '{}' already exists.\n\
             Use `vanish init --force` to overwrite it.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(&path, VanishConfig::template())
        .with_context(|| format!("Failed to write config file '{}'", path.display()))?;

    log!("init"; "wrote {}", path.display());
    Ok(path)
}
