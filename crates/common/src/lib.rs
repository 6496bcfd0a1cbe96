//! CourseRec shared building blocks
//!
//! Configuration, error taxonomy and logging setup used by every crate.

pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::CourseRecError;
pub type Result<T> = std::result::Result<T, CourseRecError>;
