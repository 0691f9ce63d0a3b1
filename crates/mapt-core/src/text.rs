//! Bounded response previews.
//!
//! Raw model output attached to terminal errors must stay diagnosable
//! without growing logs unboundedly. Truncation is byte-budgeted but always
//! lands on a char boundary — `&str[..n]` panics inside a multi-byte
//! character.

/// Ellipsis appended to truncated previews.
const ELLIPSIS: &str = "...";

/// Produce a preview of `s` at most `max_bytes` long.
///
/// Strings within budget are returned whole. Longer strings are cut at the
/// nearest char boundary at or below the budget and suffixed with `"..."`
/// (the suffix counts against the budget).
pub fn preview(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_owned();
    }
    let budget = max_bytes.saturating_sub(ELLIPSIS.len());
    let mut end = budget.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{ELLIPSIS}", &s[..end])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
