//! Prusa-style M73 progress script
//!
//! Writes `M73 P<percent> R<minutes>` after every elapsed-time comment so
//! the printer can show build percentage and time remaining.

use std::collections::BTreeMap;

use tracing::debug;

use crate::annotate::{self, AnnotateError, Outcome};
use crate::post::LayerScript;
use crate::settings::{ScriptDefinition, SettingDefinition, SettingKind, Settings};

pub const KEY: &str = "PrusaM73";
pub const NAME: &str = "Prusa M73";
pub const VERSION: u32 = 2;

pub struct PrusaM73 {
    settings: Settings,
}

impl PrusaM73 {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl Default for PrusaM73 {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl LayerScript for PrusaM73 {
    fn key(&self) -> &str {
        KEY
    }

    fn name(&self) -> &str {
        NAME
    }

    fn definition(&self) -> ScriptDefinition {
        let mut settings = BTreeMap::new();
        settings.insert(
            "enable".to_string(),
            SettingDefinition {
                label: "Enable".to_string(),
                description: "When enabled, will write settings at end of gcode".to_string(),
                kind: SettingKind::Bool,
                default_value: serde_json::Value::Bool(true),
            },
        );

        ScriptDefinition {
            name: NAME.to_string(),
            key: KEY.to_string(),
            metadata: BTreeMap::new(),
            version: VERSION,
            settings,
        }
    }

    fn execute(&self, layers: &[String]) -> Result<Outcome, AnnotateError> {
        debug!(layers = layers.len(), enable = self.settings.enable, "running {}", NAME);

        let outcome = annotate::annotate(layers, &self.settings)?;

        match &outcome {
            Outcome::Passthrough(_) => debug!("{} disabled, G-code unchanged", NAME),
            Outcome::Annotated(out) => debug!(layers = out.len(), "inserted M73 directives"),
            Outcome::MissingTotalTime => debug!("no ;TIME: marker in G-code"),
        }

        Ok(outcome)
    }
}
