//! Provider ports

pub mod search;

pub use search::SearchBackend;
