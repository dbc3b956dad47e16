use crate::analysis::token::Token;
use unicode_segmentation::UnicodeSegmentation;

/// Lowercase, collapse whitespace runs to one space and trim
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());

    for word in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(&word.to_lowercase());
    }

    normalized
}

/// Splits normalized text at Unicode word boundaries
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    pub max_token_length: usize,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        WordTokenizer {
            max_token_length: 255,
        }
    }
}

impl WordTokenizer {
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        text.unicode_word_indices()
            .filter(|(_, word)| word.len() <= self.max_token_length)
            .map(|(offset, word)| Token::new(word.to_string(), offset))
            .collect()
    }
}
