/// Truncate to at most `max_bytes`, backing off to a char boundary and
/// appending `...` when anything was cut.
pub fn truncate_str(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Round to two decimals, the precision used for ratios and percentages.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
