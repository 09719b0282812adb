// SPDX-License-Identifier: MPL-2.0
//! This module handles the crate's tunables, including loading and saving
//! them to a `feedback.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use feedback_kit::config::{self, Config};
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.max_visible.insert("toast".to_string(), 3);
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//!
//! // Build the manager settings from it
//! let manager_config = config.manager_config();
//! assert_eq!(manager_config.max_visible_for(feedback_kit::FeedbackKind::Toast).value(), 3);
//! ```

pub mod defaults;

use crate::domain::diagnostics::BufferCapacity;
use crate::domain::feedback::{MaxVisible, QueueCapacity};
use crate::error::Result;
use crate::feedback::{FeedbackKind, ManagerConfig, OverflowPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "feedback.toml";
const APP_NAME: &str = "FeedbackKit";

/// On-disk configuration.
///
/// Per-kind tables are keyed by kind name (`toast`, `modal`, ...). Entries
/// naming an unknown kind are ignored; kinds without an entry keep their
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub enter_animation_ms: u64,
    pub exit_animation_ms: u64,
    pub max_visible: BTreeMap<String, usize>,
    pub default_duration_ms: BTreeMap<String, u64>,
    pub overflow: BTreeMap<String, OverflowPolicy>,
    pub max_queue_size: usize,
    pub drag_threshold_px: f32,
    pub progress_completion_delay_ms: u64,
    pub health_check_url: Option<String>,
    pub health_check_timeout_secs: u64,
    pub id_prefix: String,
    pub diagnostics_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enter_animation_ms: defaults::DEFAULT_ENTER_ANIMATION_MS,
            exit_animation_ms: defaults::DEFAULT_EXIT_ANIMATION_MS,
            max_visible: BTreeMap::new(),
            default_duration_ms: BTreeMap::new(),
            overflow: BTreeMap::new(),
            max_queue_size: defaults::DEFAULT_MAX_QUEUE_SIZE,
            drag_threshold_px: defaults::DEFAULT_DRAG_THRESHOLD_PX,
            progress_completion_delay_ms: defaults::DEFAULT_PROGRESS_COMPLETION_DELAY_MS,
            health_check_url: None,
            health_check_timeout_secs: defaults::DEFAULT_HEALTH_CHECK_TIMEOUT_SECS,
            id_prefix: crate::feedback::DEFAULT_ID_PREFIX.to_string(),
            diagnostics_buffer_size: BufferCapacity::default().value(),
        }
    }
}

impl Config {
    /// Builds the lifecycle manager settings, layering file entries over the
    /// built-in defaults.
    #[must_use]
    pub fn manager_config(&self) -> ManagerConfig {
        let mut config = ManagerConfig {
            enter_animation: Duration::from_millis(
                self.enter_animation_ms.min(defaults::MAX_ANIMATION_MS),
            ),
            exit_animation: Duration::from_millis(
                self.exit_animation_ms.min(defaults::MAX_ANIMATION_MS),
            ),
            ..ManagerConfig::default()
        };

        for (kind, cap) in known_kinds(&self.max_visible) {
            config.max_visible.insert(kind, MaxVisible::new(cap));
        }
        for (kind, policy) in known_kinds(&self.overflow) {
            config.overflow.insert(kind, policy);
        }
        for (kind, ms) in known_kinds(&self.default_duration_ms) {
            config
                .defaults
                .entry(kind)
                .or_default()
                .duration = Some(Duration::from_millis(ms));
        }

        let prefix = self.id_prefix.trim();
        if !prefix.is_empty() {
            config.id_prefix = prefix.to_string();
        }
        config
    }

    #[must_use]
    pub fn queue_capacity(&self) -> QueueCapacity {
        QueueCapacity::new(self.max_queue_size)
    }

    #[must_use]
    pub fn buffer_capacity(&self) -> BufferCapacity {
        BufferCapacity::new(self.diagnostics_buffer_size)
    }

    #[must_use]
    pub fn progress_completion_delay(&self) -> Duration {
        Duration::from_millis(self.progress_completion_delay_ms)
    }

    /// Probe timeout, clamped to the supported range.
    #[must_use]
    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout_secs.clamp(
            defaults::MIN_HEALTH_CHECK_TIMEOUT_SECS,
            defaults::MAX_HEALTH_CHECK_TIMEOUT_SECS,
        ))
    }

    /// Negative or non-finite thresholds fall back to the default.
    #[must_use]
    pub fn drag_threshold(&self) -> f32 {
        if self.drag_threshold_px.is_finite() && self.drag_threshold_px >= 0.0 {
            self.drag_threshold_px
        } else {
            defaults::DEFAULT_DRAG_THRESHOLD_PX
        }
    }
}

fn known_kinds<V: Copy>(table: &BTreeMap<String, V>) -> impl Iterator<Item = (FeedbackKind, V)> + '_ {
    table
        .iter()
        .filter_map(|(name, value)| name.parse::<FeedbackKind>().ok().map(|kind| (kind, *value)))
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Reads a config file. Unparseable content yields the defaults.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_default())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
