// Public exports for library usage
pub mod config;
pub mod error;
pub mod extractor;
pub mod pool;
pub mod poppler;

pub use error::{RipperError, RipperResult};
pub use extractor::{page_output_path, Extractor, PageCounter, PageExtractor};
pub use pool::{run_pool, PageNumber, PoolConfig};
