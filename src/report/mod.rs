//! Source-annotated error reports
//!
//! Points at the offending payload on the line that failed to convert.

use ariadne::{Config, Label, Report, ReportKind, Source};

use crate::annotate::AnnotateError;
use crate::marker;

/// Render `error` as a diagnostic over its line
pub fn render(error: &AnnotateError, color: bool) -> String {
    let text = error.text().to_string();
    let (layer, line) = error.location();

    let bytes = marker::payload_span(&text).unwrap_or(0..text.len());
    // ariadne counts chars, not bytes
    let span = text[..bytes.start].chars().count()..text[..bytes.end].chars().count();
    let label = match error {
        AnnotateError::ZeroTotalTime { .. } => "progress needs a non-zero ;TIME: total",
        AnnotateError::OutOfRange { .. } => "too large for an M73 parameter",
        _ => "expected seconds as a number",
    };

    let mut out = Vec::new();
    let written = Report::build(ReportKind::Error, (), span.start)
        .with_config(Config::default().with_color(color))
        .with_message(error.to_string())
        .with_label(Label::new(span).with_message(label))
        .with_note(format!("layer {}, line {} of the layer block", layer, line + 1))
        .finish()
        .write(Source::from(text), &mut out);

    match written {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => error.to_string(),
    }
}
