//! Progress annotation over the slicer's layer blocks
//!
//! Two passes: find the total print time first, then rewrite every block,
//! inserting an `M73` line after each `;Generated` and `;TIME_ELAPSED:` line.
//! Nothing here logs or touches I/O.

use crate::directive::{self, M73};
use crate::marker::{self, Marker, PayloadError};
use crate::settings::Settings;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotateError {
    #[error("invalid number {payload:?} after {marker} (layer {layer}, line {})", .line + 1)]
    InvalidNumber {
        marker: Marker,
        payload: String,
        layer: usize,
        line: usize,
        text: String,
    },

    #[error("non-finite number {payload:?} after {marker} (layer {layer}, line {})", .line + 1)]
    NonFinite {
        marker: Marker,
        payload: String,
        layer: usize,
        line: usize,
        text: String,
    },

    #[error("total print time is zero; cannot compute progress (layer {layer}, line {})", .line + 1)]
    ZeroTotalTime { layer: usize, line: usize, text: String },

    #[error("M73 value does not fit a 64-bit integer (layer {layer}, line {})", .line + 1)]
    OutOfRange { layer: usize, line: usize, text: String },
}

impl AnnotateError {
    /// Layer and line (both 0-based) the error points at.
    /// Messages print the line 1-based.
    pub fn location(&self) -> (usize, usize) {
        match self {
            AnnotateError::InvalidNumber { layer, line, .. }
            | AnnotateError::NonFinite { layer, line, .. }
            | AnnotateError::ZeroTotalTime { layer, line, .. }
            | AnnotateError::OutOfRange { layer, line, .. } => (*layer, *line),
        }
    }

    /// Full text of the offending line
    pub fn text(&self) -> &str {
        match self {
            AnnotateError::InvalidNumber { text, .. }
            | AnnotateError::NonFinite { text, .. }
            | AnnotateError::ZeroTotalTime { text, .. }
            | AnnotateError::OutOfRange { text, .. } => text,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnnotateError>;

/// What the annotator produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Disabled: the stream, untouched
    Passthrough(Vec<String>),
    /// The rewritten stream, same block count and order
    Annotated(Vec<String>),
    /// No `;TIME:` line anywhere; there is nothing usable to return
    MissingTotalTime,
}

impl Outcome {
    /// Output blocks, or `None` when the stream could not be annotated
    pub fn into_layers(self) -> Option<Vec<String>> {
        match self {
            Outcome::Passthrough(layers) | Outcome::Annotated(layers) => Some(layers),
            Outcome::MissingTotalTime => None,
        }
    }
}

/// Annotate `layers` with `M73` progress directives.
pub fn annotate<S: AsRef<str>>(layers: &[S], settings: &Settings) -> Result<Outcome> {
    if !settings.enable {
        return Ok(Outcome::Passthrough(
            layers.iter().map(|l| l.as_ref().to_string()).collect(),
        ));
    }

    let total = match find_total_time(layers)? {
        Some(total) => total,
        None => return Ok(Outcome::MissingTotalTime),
    };

    let annotated = layers
        .iter()
        .enumerate()
        .map(|(index, layer)| rewrite_layer(index, layer.as_ref(), total))
        .collect::<Result<Vec<_>>>()?;

    Ok(Outcome::Annotated(annotated))
}

/// First `;TIME:` value in the stream, in seconds.
///
/// Stops reading at the matching line.
pub fn find_total_time<S: AsRef<str>>(layers: &[S]) -> Result<Option<f64>> {
    for (index, layer) in layers.iter().enumerate() {
        for (line_no, line) in layer.as_ref().split('\n').enumerate() {
            if marker::classify(line) == Some(Marker::TotalTime) {
                return parse_seconds(Marker::TotalTime, line, index, line_no).map(Some);
            }
        }
    }
    Ok(None)
}

fn rewrite_layer(index: usize, layer: &str, total: f64) -> Result<String> {
    let mut lines = Vec::new();

    for (line_no, line) in layer.split('\n').enumerate() {
        lines.push(line.to_string());

        let out_of_range = || AnnotateError::OutOfRange {
            layer: index,
            line: line_no,
            text: line.to_string(),
        };

        match marker::classify(line) {
            Some(Marker::Generated) => {
                let m73 = M73::total(directive::seconds(total)).ok_or_else(out_of_range)?;
                lines.push(m73.to_string());
            }
            Some(Marker::Elapsed) => {
                let elapsed = parse_seconds(Marker::Elapsed, line, index, line_no)?;
                if total == 0.0 {
                    return Err(AnnotateError::ZeroTotalTime {
                        layer: index,
                        line: line_no,
                        text: line.to_string(),
                    });
                }
                let m73 = M73::progress(directive::seconds(elapsed), directive::seconds(total))
                    .ok_or_else(out_of_range)?;
                lines.push(m73.to_string());
            }
            _ => {}
        }
    }

    Ok(lines.join("\n"))
}

fn parse_seconds(marker: Marker, line: &str, layer: usize, line_no: usize) -> Result<f64> {
    marker::seconds(line).map_err(|e| match e {
        PayloadError::InvalidNumber { payload } => AnnotateError::InvalidNumber {
            marker,
            payload,
            layer,
            line: line_no,
            text: line.to_string(),
        },
        PayloadError::NonFinite { payload } => AnnotateError::NonFinite {
            marker,
            payload,
            layer,
            line: line_no,
            text: line.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn enabled() -> Settings {
        Settings { enable: true }
    }

    fn annotated(layers: &[&str]) -> Vec<String> {
        match annotate(layers, &enabled()).expect("annotate failed") {
            Outcome::Annotated(out) => out,
            other => panic!("expected annotated output, got {:?}", other),
        }
    }

    fn line_count(block: &str) -> usize {
        block.split('\n').count()
    }

    #[test]
    fn test_disabled_is_identity() {
        let layers = vec![";FLAVOR:Marlin", ";LAYER:0\nG1 X1 Y1", ";TIME_ELAPSED:abc"];
        let outcome = annotate(&layers, &Settings { enable: false }).unwrap();
        assert_eq!(
            outcome,
            Outcome::Passthrough(layers.iter().map(|l| l.to_string()).collect())
        );
    }

    #[test]
    fn test_disabled_empty_stream() {
        let layers: Vec<String> = Vec::new();
        let outcome = annotate(&layers, &Settings { enable: false }).unwrap();
        assert_eq!(outcome, Outcome::Passthrough(Vec::new()));
    }

    #[test]
    fn test_missing_total_time() {
        let layers = vec![";Generated with Slicer", ";LAYER:0\n;TIME_ELAPSED:10"];
        assert_eq!(annotate(&layers, &enabled()).unwrap(), Outcome::MissingTotalTime);
        assert_eq!(Outcome::MissingTotalTime.into_layers(), None);
    }

    #[test]
    fn test_empty_stream_has_no_total_time() {
        let layers: Vec<&str> = Vec::new();
        assert_eq!(annotate(&layers, &enabled()).unwrap(), Outcome::MissingTotalTime);
    }

    #[test]
    fn test_elapsed_arithmetic() {
        let out = annotated(&[";TIME:600\nG28", ";LAYER:0\nG1 X5\n;TIME_ELAPSED:150"]);
        assert_eq!(out[0], ";TIME:600\nG28");
        assert_eq!(out[1], ";LAYER:0\nG1 X5\n;TIME_ELAPSED:150\nM73 P25 R8");
    }

    #[test]
    fn test_generated_at_start() {
        let out = annotated(&[";Generated by Slicer", ";TIME:600"]);
        assert_eq!(out[0], ";Generated by Slicer\nM73 P0 R10 ; set total time");
        assert_eq!(
            out[0].split('\n').collect::<Vec<_>>(),
            vec![";Generated by Slicer", "M73 P0 R10 ; set total time"]
        );
    }

    #[test]
    fn test_multi_layer_boundaries() {
        let out = annotated(&[
            ";TIME:120\n;LAYER:0\n;TIME_ELAPSED:0",
            ";LAYER:1\n;TIME_ELAPSED:40",
            ";LAYER:2\n;TIME_ELAPSED:120",
        ]);
        assert_eq!(out.len(), 3);
        assert!(out[0].ends_with(";TIME_ELAPSED:0\nM73 P0 R2"));
        assert!(out[1].ends_with(";TIME_ELAPSED:40\nM73 P33 R1"));
        assert!(out[2].ends_with(";TIME_ELAPSED:120\nM73 P100 R0"));
    }

    #[test]
    fn test_total_time_after_elapsed_lines() {
        // Discovery runs before the rewrite, so a late ;TIME: still applies
        let out = annotated(&[";TIME_ELAPSED:30", ";TIME:60"]);
        assert_eq!(out[0], ";TIME_ELAPSED:30\nM73 P50 R1");
    }

    #[test]
    fn test_insertion_count() {
        let input = [
            ";FLAVOR:Marlin\n;TIME:3600\n;Generated with Cura\nM82",
            ";LAYER:0\nG1 X1\n;TIME_ELAPSED:60\nG1 X2\n;TIME_ELAPSED:90",
            ";LAYER:1\nG1 X3",
            "",
        ];
        let out = annotated(&input);
        let inserted = [1, 2, 0, 0];
        for ((before, after), extra) in input.iter().zip(&out).zip(inserted) {
            assert_eq!(line_count(after), line_count(before) + extra);
        }
        assert_eq!(out[3], "");
    }

    #[test]
    fn test_negative_remaining_not_clamped() {
        let out = annotated(&[";TIME:600\n;TIME_ELAPSED:900"]);
        assert_eq!(out[0], ";TIME:600\n;TIME_ELAPSED:900\nM73 P150 R-5");
    }

    #[test]
    fn test_discovery_stops_at_first_total() {
        // A later malformed ;TIME: line is never read
        let out = annotated(&[";TIME:600", ";TIME:garbage\n;TIME_ELAPSED:300"]);
        assert_eq!(out[1], ";TIME:garbage\n;TIME_ELAPSED:300\nM73 P50 R5");
        assert_eq!(find_total_time(&[";TIME:1\n;TIME:x", ";TIME:y"]), Ok(Some(1.0)));
    }

    #[test]
    fn test_malformed_elapsed() {
        let err = annotate(&[";TIME:600", "G1\n;TIME_ELAPSED:abc"], &enabled()).unwrap_err();
        assert_eq!(
            err,
            AnnotateError::InvalidNumber {
                marker: Marker::Elapsed,
                payload: "abc".to_string(),
                layer: 1,
                line: 1,
                text: ";TIME_ELAPSED:abc".to_string(),
            }
        );
        assert_eq!(err.location(), (1, 1));
    }

    #[test]
    fn test_malformed_total() {
        let err = annotate(&["G28\n;TIME:soon"], &enabled()).unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::InvalidNumber { marker: Marker::TotalTime, layer: 0, line: 1, .. }
        ));
    }

    #[test]
    fn test_zero_total_time() {
        let out = annotated(&[";TIME:0\n;Generated"]);
        assert_eq!(out[0], ";TIME:0\n;Generated\nM73 P0 R0 ; set total time");

        let err = annotate(&[";TIME:0\n;TIME_ELAPSED:5"], &enabled()).unwrap_err();
        assert!(matches!(err, AnnotateError::ZeroTotalTime { layer: 0, line: 1, .. }));
    }

    #[test]
    fn test_crlf_lines_keep_their_endings() {
        let out = annotated(&[";TIME:600\r\n;TIME_ELAPSED:150\r\nG1 X1\r"]);
        assert_eq!(out[0], ";TIME:600\r\n;TIME_ELAPSED:150\r\nM73 P25 R8\nG1 X1\r");
    }

    #[test]
    fn test_out_of_range_values() {
        let err = annotate(&[";TIME:1e300
;Generated with Cura"], &enabled()).unwrap_err();
        assert_eq!(
            err,
            AnnotateError::OutOfRange {
                layer: 0,
                line: 1,
                text: ";Generated with Cura".to_string(),
            }
        );

        let err = annotate(&[";TIME:1", ";TIME_ELAPSED:1e20"], &enabled()).unwrap_err();
        assert!(matches!(err, AnnotateError::OutOfRange { layer: 1, line: 0, .. }));
    }
}
