//! # Sysrun Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Loading, merging and validation of the (small) sysrun configuration. The
//! only tunables are the interpreter used by `run_shell` and the creation mode
//! of redirect targets.
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.sysrun.toml` in the current directory or an ancestor
//!    (the search stops at a directory containing `.git`)
//! 2. User-specific `<config dir>/sysrun/config.toml`
//! 3. Default values defined in the code
//!
//! ## Examples
//!
//! ```toml
//! [runner]
//! shell = "/bin/bash"
//! output_mode = 0o600
//! ```
//!
//! The library entry points never read configuration files on their own; the
//! CLI loads it once and builds a `Runner` from `Config::runner`.
//!
use crate::core::error::{Result, SysrunError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Settings consumed by the process runner.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Interpreter used by `run_shell`; invoked as `<shell> -c <command>`.
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Permission bits for files created by `run_exec_redirected`.
    #[serde(default = "default_output_mode")]
    pub output_mode: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            output_mode: default_output_mode(),
        }
    }
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}
fn default_output_mode() -> u32 {
    0o644
}

const PROJECT_CONFIG_FILENAME: &str = ".sysrun.toml";

pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "Sysrun", "sysrun") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.sysrun.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win whenever they differ from the built-in default.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.runner.shell = if project_cfg.runner.shell != default_shell() {
        project_cfg.runner.shell
    } else {
        user.runner.shell
    };
    merged.runner.output_mode = if project_cfg.runner.output_mode != default_output_mode() {
        project_cfg.runner.output_mode
    } else {
        user.runner.output_mode
    };
    merged
}

fn expand_config_paths(config: &mut Config) {
    config.runner.shell = shellexpand::tilde(&config.runner.shell).into_owned();
    debug!("Expanded shell path: {}", config.runner.shell);
}

fn validate_config(config: &Config) -> Result<()> {
    let shell = Path::new(&config.runner.shell);
    if config.runner.shell.is_empty() {
        return Err(anyhow!(SysrunError::Config(
            "runner.shell cannot be empty.".to_string()
        )));
    }
    if !shell.is_absolute() {
        return Err(anyhow!(SysrunError::Config(format!(
            "runner.shell '{}' must be an absolute path.",
            shell.display()
        ))));
    }
    if !shell.exists() {
        warn!("Configured shell '{}' does not exist.", shell.display());
    }
    if config.runner.output_mode > 0o7777 {
        return Err(anyhow!(SysrunError::Config(format!(
            "runner.output_mode {:#o} is not a valid permission mode.",
            config.runner.output_mode
        ))));
    }
    Ok(())
}
