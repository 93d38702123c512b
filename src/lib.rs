//! Lector - PDF read-aloud
//!
//! Loads a PDF, extracts its text page by page, splits it into reading
//! units (sentences or whole pages), and speaks the units in order through
//! the platform text-to-speech service, with pause/resume/stop control and
//! keyword search over the extracted text.

pub mod document;
pub mod error;
pub mod reader;
pub mod search;
pub mod segment;
pub mod session;
pub mod speech;

pub use error::{LectorError, LoadError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "lector";
