//! Utility functions for DOM processing

/// Parse a CSS pixel value leniently.
///
/// Everything that is not part of a number is stripped, so `"12px"`,
/// `" 1.5px "` and `"-3"` all parse. Unparseable input yields `0.0`.
pub fn parse_px(value: &str) -> f64 {
    let numeric: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    numeric.parse().unwrap_or(0.0)
}

/// Format a pixel length the way computed styles report it
pub fn format_px(value: f64) -> String {
    format!("{}px", value)
}
