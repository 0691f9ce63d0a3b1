//! Response recovery — decoding model output that ignored format
//! instructions.
//!
//! Layered, strictly more permissive passes: direct JSON decode of the
//! whole response, then extraction of the first balanced brace-delimited
//! object from surrounding prose. The original implementation grabbed the
//! greedy first-`{`-to-last-`}` span, which misfires when trailing prose
//! contains braces; the balanced scan below tracks string literals and
//! escapes instead.

use mapt_core::AssessmentResult;

/// Decode a whole response body as an [`AssessmentResult`].
pub fn decode_result(raw: &str) -> Result<AssessmentResult, serde_json::Error> {
    serde_json::from_str(raw.trim())
}

/// Extract the first balanced `{...}` span from mixed prose.
///
/// Brace depth is tracked outside JSON string literals, honoring `\"`
/// escapes. Returns `None` when no complete object exists.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
