use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// One derived `(key, value)` pair written into the key index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexEntry {
    pub key: String,
    pub value: String,
}

impl IndexEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        IndexEntry {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Input string → keys written for it
pub type PutResult = HashMap<String, Vec<String>>;

/// Input string → value removed at its last derived key
pub type RemoveResult = HashMap<String, Option<String>>;
