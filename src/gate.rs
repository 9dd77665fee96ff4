//! Whether the admin grid is shown.
//!
//! This is a plain string comparison that toggles visibility. The sheet is
//! reachable with the same store credentials either way.

pub fn reveals(input: &str, expected: &str) -> bool {
    !expected.is_empty() && input == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        assert!(reveals("beans", "beans"));
        assert!(!reveals("Beans", "beans"));
        assert!(!reveals("beans ", "beans"));
        assert!(!reveals("", "beans"));
    }

    #[test]
    fn empty_expected_never_reveals() {
        assert!(!reveals("", ""));
    }
}
