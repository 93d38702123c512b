//! Error types for lector

use std::io;
use thiserror::Error;

/// Errors produced while turning raw bytes into a document
///
/// A failed load is reported to the caller and leaves any previously
/// loaded document untouched.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("not a PDF file")]
    NotAPdf,

    #[error("corrupt document: {0}")]
    CorruptDocument(String),

    #[error("failed to extract text from page {0}")]
    RenderFailure(u32),
}

/// Main error type for lector
#[derive(Error, Debug)]
pub enum LectorError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("speech error: {0}")]
    Speech(String),

    #[error("speech synthesis unavailable: {0}")]
    SpeechUnsupported(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for lector operations
pub type Result<T> = std::result::Result<T, LectorError>;

impl From<String> for LectorError {
    fn from(s: String) -> Self {
        LectorError::Other(s)
    }
}

impl From<&str> for LectorError {
    fn from(s: &str) -> Self {
        LectorError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for LectorError {
    fn from(e: serde_json::Error) -> Self {
        LectorError::Other(format!("JSON error: {}", e))
    }
}
