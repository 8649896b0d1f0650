//! Transcript normalization

/// Trim surrounding whitespace and lowercase every character.
///
/// No punctuation stripping and no Unicode folding beyond `to_lowercase`.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(normalize("  Next Slide \n"), "next slide");
    }

    #[test]
    fn test_keeps_punctuation() {
        assert_eq!(normalize("Go to About!"), "go to about!");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(normalize(" \t  "), "");
    }

    #[test]
    fn test_inner_whitespace_untouched() {
        assert_eq!(normalize("go  to   slide 2"), "go  to   slide 2");
    }
}
