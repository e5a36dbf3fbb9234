//! String utility functions used by field normalizers.

/// Capitalizes the first character of a string.
///
/// Single-character words are handled the same as longer ones; the rest of
/// the string is left untouched.
///
/// # Examples
///
/// ```
/// use signup_core::utils::text::capfirst;
///
/// assert_eq!(capfirst("hello"), "Hello");
/// assert_eq!(capfirst("j"), "J");
/// assert_eq!(capfirst(""), "");
/// assert_eq!(capfirst("mcDonald"), "McDonald");
/// ```
pub fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        let mut result = c.to_uppercase().to_string();
        result.extend(chars);
        result
    })
}

/// Collapses whitespace and capitalizes the first character of every word.
///
/// A word is a maximal run of non-whitespace characters. Leading, trailing
/// and repeated whitespace disappears; words are rejoined with one space.
///
/// # Examples
///
/// ```
/// use signup_core::utils::text::title_case_words;
///
/// assert_eq!(title_case_words("  john   smith "), "John Smith");
/// assert_eq!(title_case_words("ada\tlovelace"), "Ada Lovelace");
/// assert_eq!(title_case_words("   "), "");
/// ```
pub fn title_case_words(s: &str) -> String {
    s.split_whitespace()
        .map(capfirst)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capfirst() {
        assert_eq!(capfirst("hello"), "Hello");
        assert_eq!(capfirst("HELLO"), "HELLO");
        assert_eq!(capfirst("a"), "A");
        assert_eq!(capfirst(""), "");
    }

    #[test]
    fn test_capfirst_non_ascii() {
        assert_eq!(capfirst("élodie"), "Élodie");
        assert_eq!(capfirst("ßtraße"), "SStraße");
    }

    #[test]
    fn test_title_case_words_collapses_whitespace() {
        assert_eq!(title_case_words("  john   smith "), "John Smith");
        assert_eq!(title_case_words("john\n\nsmith"), "John Smith");
    }

    #[test]
    fn test_title_case_words_single_letter_words() {
        assert_eq!(title_case_words("j r r tolkien"), "J R R Tolkien");
    }

    #[test]
    fn test_title_case_words_keeps_inner_case() {
        assert_eq!(title_case_words("diego VON neumann"), "Diego VON Neumann");
    }

    #[test]
    fn test_title_case_words_empty() {
        assert_eq!(title_case_words(""), "");
        assert_eq!(title_case_words(" \t "), "");
    }
}
