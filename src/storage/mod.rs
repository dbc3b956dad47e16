pub mod connection;
pub mod sqlite;
pub mod persistence;
