// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Engine settings via `monitor.yaml`.

use crate::core::formatting::ColorScheme;
use crate::core::values::SubscriberCountPolicy;
use crate::core::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Defaults applied to every formatter unless a marker overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingSettings {
    /// Wrap colored parts in `<color=#RRGGBB>` markup.
    pub rich_text: bool,
    pub colors: ColorScheme,
    /// Spaces before each collection element line.
    pub default_indent: usize,
    pub show_index: bool,
}

impl Default for FormattingSettings {
    fn default() -> Self {
        Self {
            rich_text: false,
            colors: ColorScheme::default(),
            default_indent: 2,
            show_index: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    pub subscriber_count_policy: SubscriberCountPolicy,
    /// List subscriber names under the count.
    pub show_subscribers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Run the profiling batch on a worker thread.
    pub async_profiling: bool,
    /// Module name prefixes never scanned, on top of the built-in list.
    pub banned_module_prefixes: Vec<String>,
    /// Exact module names never scanned.
    pub banned_modules: Vec<String>,
    /// Allow units to write back through members marked writable.
    pub enable_setters: bool,
    pub formatting: FormattingSettings,
    pub events: EventSettings,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            async_profiling: true,
            banned_module_prefixes: Vec::new(),
            banned_modules: Vec::new(),
            enable_setters: true,
            formatting: FormattingSettings::default(),
            events: EventSettings::default(),
        }
    }
}

impl MonitorSettings {
    /// Settings file name.
    pub const FILE_NAME: &'static str = "monitor.yaml";

    /// Environment variable overriding [`MonitorSettings::async_profiling`].
    pub const ASYNC_ENV: &'static str = "MONITORLIB_ASYNC_PROFILING";

    /// Load settings from a directory. Returns error if the file is missing
    /// or cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::FILE_NAME);

        let content = std::fs::read_to_string(&path).map_err(|e| {
            MonitorError::Settings(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut settings: Self = serde_yaml::from_str(&content).map_err(|e| {
            MonitorError::Settings(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        settings.apply_env_overrides();

        tracing::info!("Loaded monitor settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a directory, returning defaults if the file is
    /// missing or unparseable.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(Self::FILE_NAME);

        if !path.exists() {
            tracing::debug!(
                "No {} found in {}, using defaults",
                Self::FILE_NAME,
                dir.display()
            );
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return settings;
        }

        match Self::load(dir) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                let mut settings = Self::default();
                settings.apply_env_overrides();
                settings
            }
        }
    }

    /// Apply `MONITORLIB_ASYNC_PROFILING` if set.
    pub fn apply_env_overrides(&mut self) {
        let value = std::env::var(Self::ASYNC_ENV).ok();
        self.apply_async_override(value.as_deref());
    }

    fn apply_async_override(&mut self, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => self.async_profiling = true,
            "0" | "false" | "no" | "off" => self.async_profiling = false,
            other => tracing::warn!(
                "Ignoring {}={:?}, expected 0 or 1",
                Self::ASYNC_ENV,
                other
            ),
        }
    }
}
