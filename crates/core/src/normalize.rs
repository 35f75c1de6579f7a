//! String normalization applied before comparing provider values against
//! stored values.
//!
//! Upstream feeds and our own store disagree on cosmetics far more often
//! than on substance: padding whitespace, letter case, and the separator
//! used in score strings (`"2:1"` vs `"2-1"`). [`comparable`] folds all of
//! those away so the reconciliation engine only reports real differences.

/// Normalize a raw field value into its comparable form.
///
/// Rules, in order:
/// - leading/trailing whitespace is trimmed
/// - internal whitespace runs collapse to a single space
/// - ASCII letters are lowercased
/// - `:` becomes `-` (score-separator equivalence)
///
/// The function is idempotent: `comparable(comparable(s)) == comparable(s)`.
pub fn comparable(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = false;

    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        last_was_space = false;
        match ch {
            ':' => out.push('-'),
            c => out.extend(c.to_lowercase()),
        }
    }

    out
}

/// Compare two raw values under [`comparable`] normalization.
pub fn eq_comparable(a: &str, b: &str) -> bool {
    comparable(a) == comparable(b)
}
