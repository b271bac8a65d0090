use crate::poppler::{PDFINFO, PDFTOTEXT};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Extract the text of every page of a PDF into its own file, in parallel
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Input PDF file path
    #[arg(short = 'i', long, env = "PDFRIPPER_INPUT")]
    pub input: String,

    /// Output directory (default: PDF basename without extension)
    #[arg(short = 'o', long, env = "PDFRIPPER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Number of concurrent workers (0 = number of CPU cores)
    #[arg(short = 'p', long, env = "PDFRIPPER_PROCESSES", default_value = "0")]
    pub processes: usize,

    /// Page count tool
    #[arg(long, env = "PDFINFO_BIN", default_value = PDFINFO)]
    pub pdfinfo: String,

    /// Per-page text extraction tool
    #[arg(long, env = "PDFTOTEXT_BIN", default_value = PDFTOTEXT)]
    pub pdftotext: String,
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_pdf_path(&self.input)?;
        validate_tool_name(&self.pdfinfo)?;
        validate_tool_name(&self.pdftotext)?;
        Ok(())
    }

    /// Output directory as given, empty when not set
    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_default()
    }
}

/// Validate the input PDF path
pub fn validate_pdf_path(path: &str) -> anyhow::Result<()> {
    if path.is_empty() {
        anyhow::bail!("input PDF file must be specified");
    }

    // Null bytes cannot be passed as process arguments
    if path.contains('\0') {
        anyhow::bail!("input PDF path contains a null byte");
    }

    Ok(())
}

/// Validate an external tool name or path
pub fn validate_tool_name(tool: &str) -> anyhow::Result<()> {
    if tool.trim().is_empty() {
        anyhow::bail!("Tool command cannot be empty");
    }

    if tool.chars().any(char::is_control) {
        anyhow::bail!("Tool command contains invalid characters");
    }

    Ok(())
}

/// Worker count to use: `requested`, or the number of CPU cores when 0
#[must_use]
pub fn resolve_worker_count(requested: usize) -> usize {
    if requested < 1 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}

/// Output directory to use: `output_dir`, or the PDF file name without its
/// extension when empty
pub fn resolve_output_dir(pdf_path: &Path, output_dir: &Path) -> anyhow::Result<PathBuf> {
    if !output_dir.as_os_str().is_empty() {
        return Ok(output_dir.to_path_buf());
    }

    match pdf_path.file_stem() {
        Some(stem) if !stem.is_empty() => Ok(PathBuf::from(stem)),
        _ => anyhow::bail!(
            "cannot derive an output directory from '{}'",
            pdf_path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pdf_path_valid() {
        assert!(validate_pdf_path("report.pdf").is_ok());
        assert!(validate_pdf_path("/srv/docs/annual report.pdf").is_ok());
        assert!(validate_pdf_path("scan").is_ok());
    }

    #[test]
    fn test_validate_pdf_path_empty() {
        assert!(validate_pdf_path("").is_err());
    }

    #[test]
    fn test_validate_pdf_path_null_byte() {
        assert!(validate_pdf_path("doc\0.pdf").is_err());
    }

    #[test]
    fn test_validate_pdf_path_accepts_unusual_unix_names() {
        assert!(validate_pdf_path("   ").is_ok());
        assert!(validate_pdf_path("doc\n.pdf").is_ok());
        assert!(validate_pdf_path("tab\there.pdf").is_ok());
    }

    #[test]
    fn test_validate_tool_name() {
        assert!(validate_tool_name("pdftotext").is_ok());
        assert!(validate_tool_name("/usr/local/bin/pdfinfo").is_ok());
        assert!(validate_tool_name("").is_err());
        assert!(validate_tool_name("pdf\tinfo").is_err());
    }

    #[test]
    fn test_resolve_worker_count() {
        assert_eq!(resolve_worker_count(3), 3);
        assert!(resolve_worker_count(0) >= 1);
    }

    #[test]
    fn test_resolve_output_dir_strips_extension() {
        let dir = resolve_output_dir(Path::new("docs/report.pdf"), Path::new("")).unwrap();
        assert_eq!(dir, PathBuf::from("report"));

        let dir = resolve_output_dir(Path::new("archive.v2.pdf"), Path::new("")).unwrap();
        assert_eq!(dir, PathBuf::from("archive.v2"));

        let dir = resolve_output_dir(Path::new("noext"), Path::new("")).unwrap();
        assert_eq!(dir, PathBuf::from("noext"));
    }

    #[test]
    fn test_resolve_output_dir_explicit_wins() {
        let dir = resolve_output_dir(Path::new("report.pdf"), Path::new("out/pages")).unwrap();
        assert_eq!(dir, PathBuf::from("out/pages"));
    }

    #[test]
    fn test_resolve_output_dir_rejects_unnamed_path() {
        assert!(resolve_output_dir(Path::new(".."), Path::new("")).is_err());
        assert!(resolve_output_dir(Path::new("/"), Path::new("")).is_err());
    }

    #[test]
    fn test_config_parses_flags() {
        let config = Config::try_parse_from([
            "pdfripper",
            "-i",
            "book.pdf",
            "-o",
            "pages",
            "-p",
            "4",
        ])
        .unwrap();

        assert_eq!(config.input, "book.pdf");
        assert_eq!(config.output_dir(), PathBuf::from("pages"));
        assert_eq!(config.processes, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_requires_input() {
        assert!(Config::try_parse_from(["pdfripper", "-p", "2"]).is_err());
    }
}
