/// Lowercased runs of ASCII letters and digits.
///
/// Everything else, including non-ASCII letters, separates tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|run| !run.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::tokenize;

    #[test]
    fn splits_on_non_alphanumerics() {
        assert_eq!(
            tokenize("Retrieval-Augmented Generation (RAG), 2020!"),
            ["retrieval", "augmented", "generation", "rag", "2020"]
        );
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(tokenize("café πr²"), ["caf", "r"]);
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("-- ... !!").is_empty());
    }

    #[test]
    fn keeps_single_characters_and_repeats() {
        assert_eq!(tokenize("a A a"), ["a", "a", "a"]);
    }
}
