//! Tokenizer shared by the index builder and the search client.
//!
//! The browser client receives [`STOP_WORDS`] verbatim when its script is
//! written, so both sides always agree on what a term is.

/// English stop words, sorted for binary search.
pub const STOP_WORDS: &[&str] = &[
    "a", "able", "about", "across", "after", "all", "almost", "also", "am", "among", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "but", "by", "can", "cannot", "could",
    "dear", "did", "do", "does", "either", "else", "ever", "every", "for", "from", "get", "got",
    "had", "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "just", "least", "let", "like", "likely", "may", "me", "might",
    "most", "must", "my", "neither", "no", "nor", "not", "of", "off", "often", "on", "only", "or",
    "other", "our", "own", "rather", "said", "say", "says", "she", "should", "since", "so",
    "some", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "tis", "to", "too", "twas", "us", "wants", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "yet", "you", "your",
];

pub fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.binary_search(&term).is_ok()
}

/// Lowercase, split on anything that is not a letter or digit, drop stop
/// words. Terms keep their order and repeats.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .filter(|term| !is_stop_word(term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_sorted_and_unique() {
        assert!(STOP_WORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("The Proxy-server, and a PROXY!"),
            ["proxy", "server", "proxy"]
        );
    }

    #[test]
    fn test_tokenize_unicode() {
        assert_eq!(tokenize("Ünïcode café, naïve"), ["ünïcode", "café", "naïve"]);
        assert_eq!(tokenize("Rust 2024"), ["rust", "2024"]);
    }

    #[test]
    fn test_tokenize_only_stop_words() {
        assert!(tokenize("it is what it is").is_empty());
        assert!(tokenize("  ...  ").is_empty());
    }
}
