use serde::{Serialize, Deserialize};

/// A word found in normalized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,      // The word itself
    pub offset: usize,     // Byte offset in the normalized text
}

impl Token {
    pub fn new(text: String, offset: usize) -> Self {
        Token { text, offset }
    }
}
