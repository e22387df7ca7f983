//! Romanization-aware person indexing and search.
//!
//! Person records are romanized through pluggable transliteration adapters,
//! indexed per repository, and found again by Latin-script name queries.

pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
