//! Core application layer
//!
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigOverrides};
pub use error::{ErrorContext, ErrorKind, PortalError, Result};
pub use logging::Logger;
