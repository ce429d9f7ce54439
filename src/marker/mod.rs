use logos::Logos;
use thiserror::Error;

/// Line prefixes the slicer writes into its comment stream.
/// Anything else is an opaque instruction line.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Estimated total print duration, in seconds
    #[token(";TIME:")]
    TotalTime,

    /// Print time elapsed at this point of the file, in seconds
    #[token(";TIME_ELAPSED:")]
    Elapsed,

    /// Start of the generation metadata (";Generated with ...")
    #[token(";Generated")]
    Generated,
}

impl Marker {
    pub fn prefix(self) -> &'static str {
        match self {
            Marker::TotalTime => ";TIME:",
            Marker::Elapsed => ";TIME_ELAPSED:",
            Marker::Generated => ";Generated",
        }
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    #[error("invalid number {payload:?}")]
    InvalidNumber { payload: String },

    #[error("non-finite number {payload:?}")]
    NonFinite { payload: String },
}

/// Classify a line by its leading marker.
///
/// Only the very start of the line is considered; a marker that appears
/// later in the line does not count.
pub fn classify(line: &str) -> Option<Marker> {
    let mut lexer = Marker::lexer(line);
    match lexer.next() {
        Some(Ok(marker)) if lexer.span().start == 0 => Some(marker),
        _ => None,
    }
}

/// Byte range of the payload: the second `:`-separated field of the line.
pub fn payload_span(line: &str) -> Option<std::ops::Range<usize>> {
    let start = line.find(':')? + 1;
    let end = line[start..]
        .find(':')
        .map(|offset| start + offset)
        .unwrap_or(line.len());
    Some(start..end)
}

/// Parse the seconds value carried by a `;TIME:` or `;TIME_ELAPSED:` line.
///
/// Further `:` segments after the payload are ignored.
pub fn seconds(line: &str) -> Result<f64, PayloadError> {
    let raw = payload_span(line).map(|span| &line[span]).unwrap_or("");
    let payload = raw.trim();

    let value = payload
        .parse::<f64>()
        .map_err(|_| PayloadError::InvalidNumber {
            payload: payload.to_string(),
        })?;

    if !value.is_finite() {
        return Err(PayloadError::NonFinite {
            payload: payload.to_string(),
        });
    }

    Ok(value)
}
