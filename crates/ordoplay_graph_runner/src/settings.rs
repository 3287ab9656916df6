// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runner settings stored as RON.

use ordoplay_graph::{Clock, ExternalInputs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "runner.ron";

/// What to run and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Format version
    pub version: u32,
    /// Serialized graph text, relative to the settings file
    pub graph: PathBuf,
    /// Ticks to run
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    /// Time source
    #[serde(default)]
    pub clock: Clock,
    /// Extra `tracing` filter directives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    /// Values pushed into external slots before the first tick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<ExternalInputs>,
}

fn default_ticks() -> u32 {
    1
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            graph: PathBuf::from("graph.txt"),
            ticks: default_ticks(),
            clock: Clock::Fixed { dt: 1.0 / 60.0 },
            log_filter: None,
            inputs: None,
        }
    }
}

impl RunnerSettings {
    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> std::io::Result<Self> {
        let settings: RunnerSettings = ron::from_str(content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        Self::from_ron(&std::fs::read_to_string(path)?)
    }

    /// Pretty-printed RON
    pub fn to_ron(&self) -> std::io::Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_ron()?)
    }

    /// Graph path resolved against the settings file's directory
    pub fn graph_path(&self, settings_path: &Path) -> PathBuf {
        match settings_path.parent() {
            Some(dir) if self.graph.is_relative() => dir.join(&self.graph),
            _ => self.graph.clone(),
        }
    }
}
