pub mod token;
pub mod tokenizer;
pub mod analyzer;
pub mod partial_match;
pub mod whole_string;
