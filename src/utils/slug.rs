/// Lower-cases and hyphenates spaces, the same way titles are compared in SQL.
pub fn slugify(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "-")
}

/// Detail identifiers made only of ASCII digits address a vacancy by id.
pub fn parse_numeric_id(identifier: &str) -> Option<i64> {
    if identifier.is_empty() || !identifier.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    identifier.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_hyphenates_and_lowercases() {
        assert_eq!(slugify("Senior Backend Engineer"), "senior-backend-engineer");
        assert_eq!(slugify("  QA Lead "), "qa-lead");
        assert_eq!(slugify("SENIOR-backend-Engineer"), "senior-backend-engineer");
    }

    #[test]
    fn numeric_ids_only_for_digit_strings() {
        assert_eq!(parse_numeric_id("42"), Some(42));
        assert_eq!(parse_numeric_id("42a"), None);
        assert_eq!(parse_numeric_id("-1"), None);
        assert_eq!(parse_numeric_id(""), None);
        assert_eq!(parse_numeric_id("senior-backend-engineer"), None);
    }
}
