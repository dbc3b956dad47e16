pub mod types;
pub mod config;
pub mod error;
pub mod stats;
pub mod service;
pub mod index_core;
pub mod catalog;
