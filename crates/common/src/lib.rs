//! Precis Common Library
//!
//! Shared code for the Precis services including:
//! - Database models and repository patterns
//! - Generative model client abstraction
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Upload storage
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod storage;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use llm::TextGenerator;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generative model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
