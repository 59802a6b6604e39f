pub mod config;
pub mod error;

pub use config::{Config, StubUrl};
pub use error::ConfigError;
