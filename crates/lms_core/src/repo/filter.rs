//! Search predicates shared by list pages.

/// Case-insensitive substring match of `query` against any field.
///
/// A blank query matches everything.
pub fn matches_text<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Trimmed, case-insensitive equality.
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Pushes `value` unless already present; returns whether it was added.
pub fn push_unique(items: &mut Vec<String>, value: &str) -> bool {
    if items.iter().any(|item| item == value) {
        return false;
    }
    items.push(value.to_string());
    true
}
