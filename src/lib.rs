pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod notifier;
pub mod store;
pub mod tracker;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
