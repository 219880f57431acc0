use std::str::SplitWhitespace;

/// Lazy token stream over a query string.
///
/// Cloning yields an independent stream positioned at the same token, so the
/// sequence can be restarted by cloning it before consumption.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(str::to_lowercase)
    }
}

/// Splits text on whitespace and lowercases each piece.
///
/// There is no stemming and no stop-word removal: terms are matched as
/// substrings, so the raw lowercase word is exactly what scoring needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize text into a lazy stream of lowercase terms
    pub fn tokenize<'a>(&self, text: &'a str) -> Tokens<'a> {
        Tokens {
            inner: text.split_whitespace(),
        }
    }

    /// Collect all terms, keeping duplicates and query order
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.tokenize(text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.analyze("  Layer 2\tScaling\nDeFi ");
        assert_eq!(tokens, vec!["layer", "2", "scaling", "defi"]);
    }

    #[test]
    fn test_no_stemming_or_stopwords() {
        let tokens = Tokenizer::new().analyze("The Rollups are running");
        assert_eq!(tokens, vec!["the", "rollups", "are", "running"]);
    }

    #[test]
    fn test_punctuation_kept() {
        let tokens = Tokenizer::new().analyze("Ethereum's play-to-earn");
        assert_eq!(tokens, vec!["ethereum's", "play-to-earn"]);
    }

    #[test]
    fn test_empty_input() {
        let tokenizer = Tokenizer::new();
        assert_eq!(tokenizer.tokenize("").count(), 0);
        assert_eq!(tokenizer.tokenize("   \t\n").count(), 0);
    }

    #[test]
    fn test_restartable() {
        let tokens = Tokenizer::new().tokenize("nft defi");
        let first: Vec<_> = tokens.clone().collect();
        let second: Vec<_> = tokens.collect();
        assert_eq!(first, second);
    }
}
