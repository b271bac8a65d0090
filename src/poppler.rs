// Allow module inception - tool wrappers share the module's vocabulary
#![allow(clippy::module_name_repetitions)]

use crate::error::{RipperError, RipperResult};
use crate::extractor::{PageCounter, PageExtractor};
use crate::pool::PageNumber;
use std::ffi::OsStr;
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Default page-count tool
pub const PDFINFO: &str = "pdfinfo";
/// Default per-page text extraction tool
pub const PDFTOTEXT: &str = "pdftotext";

/// Label of the `pdfinfo` line carrying the page count
const PAGES_LABEL: &str = "Pages:";

/// Page counter backed by `pdfinfo`
#[derive(Debug, Clone)]
pub struct PdfInfo {
    program: String,
}

impl PdfInfo {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdfInfo {
    fn default() -> Self {
        Self::new(PDFINFO)
    }
}

impl PageCounter for PdfInfo {
    async fn count_pages(&self, pdf_path: &Path) -> RipperResult<u32> {
        let stdout = run_tool(&self.program, [pdf_path.as_os_str()]).await?;
        parse_page_count(&stdout)
    }
}

/// Per-page extractor backed by `pdftotext -f <page> -l <page>`
#[derive(Debug, Clone)]
pub struct PdfToText {
    program: String,
}

impl PdfToText {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PdfToText {
    fn default() -> Self {
        Self::new(PDFTOTEXT)
    }
}

impl PageExtractor for PdfToText {
    fn extract_page(
        &self,
        pdf_path: &Path,
        page: PageNumber,
        destination: &Path,
    ) -> impl Future<Output = RipperResult<()>> + Send {
        let program = self.program.clone();
        let pdf_path = pdf_path.to_path_buf();
        let destination = destination.to_path_buf();

        async move {
            let page = page.to_string();
            run_tool(
                &program,
                [
                    OsStr::new("-f"),
                    OsStr::new(&page),
                    OsStr::new("-l"),
                    OsStr::new(&page),
                    pdf_path.as_os_str(),
                    destination.as_os_str(),
                ],
            )
            .await
            .map(|_| ())
        }
    }
}

/// Extract the page count from `pdfinfo` output
///
/// The first line starting with `Pages:` that carries a second token decides
/// the result.
///
/// # Errors
///
/// Returns `RipperError::Parse` if no such line exists or its value is not an
/// integer
pub fn parse_page_count(output: &str) -> RipperResult<u32> {
    for line in output.lines() {
        if !line.starts_with(PAGES_LABEL) {
            continue;
        }

        if let Some(value) = line.split_whitespace().nth(1) {
            return value.parse::<u32>().map_err(|e| {
                RipperError::Parse(format!("invalid page count '{value}': {e}"))
            });
        }
    }

    Err(RipperError::Parse(
        "could not determine number of pages from pdfinfo output".to_string(),
    ))
}

/// Run an external tool to completion and return its stdout
///
/// # Errors
///
/// Returns `RipperError::ExternalTool` if the process cannot be spawned or
/// exits unsuccessfully
async fn run_tool<I, S>(program: &str, args: I) -> RipperResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    if program.is_empty() {
        return Err(RipperError::InvalidConfig(
            "Tool command cannot be empty".to_string(),
        ));
    }

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!("Running {:?}", command.as_std());

    let output = command.output().await.map_err(|e| RipperError::ExternalTool {
        tool: program.to_string(),
        reason: format!("failed to spawn: {e}"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let reason = if stderr.is_empty() {
            output.status.to_string()
        } else {
            format!("{}: {stderr}", output.status)
        };
        return Err(RipperError::ExternalTool {
            tool: program.to_string(),
            reason,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
