//! Script settings - JSON-based
//!
//! A single `enable` toggle, plus the self-describing definition a host
//! pipeline uses to render and validate it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runtime values of the script's settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Run the annotator at all
    #[serde(default = "default_enable")]
    pub enable: bool,
}

fn default_enable() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable: default_enable(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Value type of a setting, as the host pipeline names it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SettingKind {
    #[serde(rename = "bool")]
    Bool,
}

/// One entry of `ScriptDefinition::settings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingDefinition {
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: SettingKind,
    pub default_value: serde_json::Value,
}

/// Registration record for a post-processing script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptDefinition {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    pub version: u32,
    pub settings: BTreeMap<String, SettingDefinition>,
}

impl ScriptDefinition {
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Settings populated from each definition's default value
    pub fn defaults(&self) -> Result<Settings, SettingsError> {
        let values: serde_json::Map<String, serde_json::Value> = self
            .settings
            .iter()
            .map(|(key, def)| (key.clone(), def.default_value.clone()))
            .collect();
        Ok(serde_json::from_value(serde_json::Value::Object(values))?)
    }
}
