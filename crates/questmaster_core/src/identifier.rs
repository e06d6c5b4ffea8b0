//! Identifier normalisation.

/// Normalises an identifier for comparison.
///
/// The planner and the oracle disagree on separator style (`pick_up` vs
/// `pick-up`), so underscores fold to hyphens and case is dropped.
///
/// # Examples
///
/// ```
/// use questmaster_core::normalize_identifier;
///
/// assert_eq!(normalize_identifier("Pick_Up"), "pick-up");
/// ```
pub fn normalize_identifier(name: &str) -> String {
    name.trim().to_lowercase().replace('_', "-")
}

/// Whether two identifiers name the same thing after normalisation.
pub fn identifiers_match(a: &str, b: &str) -> bool {
    normalize_identifier(a) == normalize_identifier(b)
}
