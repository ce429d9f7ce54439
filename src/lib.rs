//! Inserts `M73` build-progress directives into sliced 3D-printer G-code.
//!
//! The slicer's output arrives as one text block per layer. [`annotate::annotate`]
//! finds the `;TIME:` total and writes an `M73 P<percent> R<minutes>` line after
//! every `;TIME_ELAPSED:` comment, plus a total-time directive after the
//! `;Generated` header line.

pub mod annotate;
pub mod cli;
pub mod directive;
pub mod layers;
pub mod marker;
pub mod post;
pub mod report;
pub mod settings;

pub use annotate::{annotate, AnnotateError, Outcome};
pub use settings::Settings;
