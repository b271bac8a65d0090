// Allow module inception for error types - this is a common Rust pattern
#![allow(clippy::module_name_repetitions)]

use thiserror::Error;

use crate::pool::PageNumber;

#[derive(Error, Debug)]
pub enum RipperError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{tool} failed: {reason}")]
    ExternalTool { tool: String, reason: String },

    #[error("Page count parse error: {0}")]
    Parse(String),

    #[error("extracting page {page}: {source}")]
    PageExtraction {
        page: PageNumber,
        #[source]
        source: Box<RipperError>,
    },

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RipperError {
    /// Page number carried by a per-page failure, if this is one
    #[must_use]
    pub fn page(&self) -> Option<PageNumber> {
        match self {
            Self::PageExtraction { page, .. } => Some(*page),
            _ => None,
        }
    }
}

pub type RipperResult<T> = Result<T, RipperError>;
