//! Flat G-code file <-> layer blocks
//!
//! Slicers mark each layer with a `;LAYER:<n>` comment. Everything before the
//! first marker is the header block. Splitting then joining gives back the
//! original text byte for byte.

const LAYER_MARKER: &str = ";LAYER:";

/// Split a G-code file into layer blocks
pub fn split(gcode: &str) -> Vec<String> {
    let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];

    for line in gcode.split('\n') {
        let starts_layer = line.starts_with(LAYER_MARKER);
        match blocks.last_mut() {
            Some(current) if !(starts_layer && !current.is_empty()) => current.push(line),
            _ => blocks.push(vec![line]),
        }
    }

    blocks.into_iter().map(|lines| lines.join("\n")).collect()
}

/// Join layer blocks back into one file
pub fn join<S: AsRef<str>>(blocks: &[S]) -> String {
    blocks
        .iter()
        .map(|b| b.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}
