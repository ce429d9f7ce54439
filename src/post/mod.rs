//! Post-processing scripts over sliced layer blocks
//!
//! A host pipeline hands each script the full list of layer blocks and
//! receives the rewritten list back. Scripts describe their own settings so
//! the host can present them.

use crate::annotate::{AnnotateError, Outcome};
use crate::settings::ScriptDefinition;
use thiserror::Error;
use tracing::warn;

pub mod m73;

pub use m73::PrusaM73;

#[derive(Error, Debug)]
pub enum PostError {
    #[error(transparent)]
    Annotate(#[from] AnnotateError),

    #[error("{script}: no ;TIME: line in the G-code, cannot annotate")]
    MissingTotalTime { script: String },
}

/// Post-processing script trait - implemented for each script
pub trait LayerScript {
    /// Stable identifier used by the host to register the script
    fn key(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Settings schema the host renders
    fn definition(&self) -> ScriptDefinition;

    /// Run over the layer blocks
    fn execute(&self, layers: &[String]) -> Result<Outcome, AnnotateError>;
}

/// What to do with the stream when the script could not annotate it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the post-processing step with an error
    #[default]
    Abort,
    /// Hand the original blocks on, unannotated
    Passthrough,
}

/// Run `script` and settle its outcome according to `policy`.
///
/// Conversion errors always surface; the policy only covers a stream with
/// nothing to annotate from.
pub fn run(
    script: &dyn LayerScript,
    layers: &[String],
    policy: FailurePolicy,
) -> Result<Vec<String>, PostError> {
    match script.execute(layers)? {
        Outcome::Passthrough(out) | Outcome::Annotated(out) => Ok(out),
        Outcome::MissingTotalTime => match policy {
            FailurePolicy::Abort => Err(PostError::MissingTotalTime {
                script: script.name().to_string(),
            }),
            FailurePolicy::Passthrough => {
                warn!(script = script.key(), "no total time found, passing G-code through unannotated");
                Ok(layers.to_vec())
            }
        },
    }
}
