use crate::config::{self, Config};
use crate::error::{RipperError, RipperResult};
use crate::poppler::{PdfInfo, PdfToText};
use crate::pool::{run_pool, PageNumber, PoolConfig};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Source of the total page count for a document
#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub trait PageCounter {
    /// Number of pages in `pdf_path`
    async fn count_pages(&self, pdf_path: &Path) -> RipperResult<u32>;
}

/// Extracts the text of a single page into `destination`
pub trait PageExtractor {
    fn extract_page(
        &self,
        pdf_path: &Path,
        page: PageNumber,
        destination: &Path,
    ) -> impl Future<Output = RipperResult<()>> + Send;
}

/// Destination file for `page` inside `output_dir`
#[must_use]
pub fn page_output_path(output_dir: &Path, page: PageNumber) -> PathBuf {
    output_dir.join(format!("page_{page}.txt"))
}

/// Per-page PDF text extractor
#[derive(Debug)]
pub struct Extractor<C = PdfInfo, E = PdfToText> {
    pdf_path: PathBuf,
    output_dir: PathBuf,
    process_count: usize,
    counter: C,
    extractor: Arc<E>,
}

impl Extractor {
    /// Create an extractor backed by `pdfinfo` and `pdftotext`
    ///
    /// An empty `output_dir` defaults to the PDF's file name without its
    /// extension; a `process_count` of 0 defaults to the number of CPU cores.
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF path is empty or invalid, or the output
    /// directory cannot be created
    pub async fn new(
        pdf_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        process_count: usize,
    ) -> RipperResult<Self> {
        Self::with_tools(
            pdf_path,
            output_dir,
            process_count,
            PdfInfo::default(),
            PdfToText::default(),
        )
        .await
    }

    /// Create an extractor from command line configuration
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails or the output
    /// directory cannot be created
    pub async fn from_config(config: &Config) -> RipperResult<Self> {
        config
            .validate()
            .map_err(|e| RipperError::InvalidConfig(e.to_string()))?;

        Self::with_tools(
            config.input.as_str(),
            config.output_dir(),
            config.processes,
            PdfInfo::new(config.pdfinfo.as_str()),
            PdfToText::new(config.pdftotext.as_str()),
        )
        .await
    }
}

impl<C, E> Extractor<C, E>
where
    C: PageCounter,
    E: PageExtractor + Send + Sync + 'static,
{
    /// Create an extractor with custom page counting and extraction tools
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF path is empty or invalid, or the output
    /// directory cannot be created
    pub async fn with_tools(
        pdf_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        process_count: usize,
        counter: C,
        extractor: E,
    ) -> RipperResult<Self> {
        let pdf_path = pdf_path.into();
        config::validate_pdf_path(&pdf_path.to_string_lossy())
            .map_err(|e| RipperError::InvalidConfig(e.to_string()))?;

        let output_dir: PathBuf = output_dir.into();
        let output_dir = config::resolve_output_dir(&pdf_path, &output_dir)
            .map_err(|e| RipperError::InvalidConfig(e.to_string()))?;
        tokio::fs::create_dir_all(&output_dir).await?;

        let process_count = config::resolve_worker_count(process_count);

        info!(
            "Extracting {} into {} with up to {} workers",
            pdf_path.display(),
            output_dir.display(),
            process_count
        );

        Ok(Self {
            pdf_path,
            output_dir,
            process_count,
            counter,
            extractor: Arc::new(extractor),
        })
    }

    /// Extract every page into `<output_dir>/page_<n>.txt`
    ///
    /// Every page is attempted even when some fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the page count cannot be determined, or the first
    /// per-page failure recorded during the run
    pub async fn extract_pages(&self) -> RipperResult<()> {
        let total_pages = self.counter.count_pages(&self.pdf_path).await?;
        info!("Total pages: {total_pages}");

        let extractor = Arc::clone(&self.extractor);
        let pdf_path = Arc::new(self.pdf_path.clone());
        let output_dir = Arc::new(self.output_dir.clone());

        run_pool(
            PoolConfig::new(total_pages, self.process_count),
            move |page| {
                let extractor = Arc::clone(&extractor);
                let pdf_path = Arc::clone(&pdf_path);
                let destination = page_output_path(&output_dir, page);

                async move {
                    let result = extractor
                        .extract_page(&pdf_path, page, &destination)
                        .await;
                    if result.is_ok() {
                        info!("Saved page {page} to {}", destination.display());
                    }
                    result
                }
            },
        )
        .await
    }

    /// Directory receiving the page files
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Resolved worker count
    #[must_use]
    pub fn process_count(&self) -> usize {
        self.process_count
    }
}
