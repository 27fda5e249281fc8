// Local HTML preview of a certificate
//
// Uses the same template code as the server, so what is written here is
// what the browser would print.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use certificate_core::{CertificateAssets, CertificateRequest};
use chrono::NaiveDate;

/// Parses a `DD/MM/YYYY` date as printed on certificates.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y")
        .map_err(|e| anyhow!("Invalid date '{}': {} (expected DD/MM/YYYY)", value, e))
}

/// Default output file: `<id>.html` in the working directory.
pub fn default_output(id: &str) -> PathBuf {
    PathBuf::from(format!("{}.html", id))
}

/// Renders the certificate HTML for `request` using assets from `assets_dir`.
pub fn render(assets_dir: &Path, request: &CertificateRequest, date: NaiveDate) -> Result<String> {
    let assets = CertificateAssets::load(assets_dir)
        .with_context(|| format!("Failed to load assets from '{}'", assets_dir.display()))?;
    let context = assets.context_for(request, date);
    Ok(assets.render(&context)?)
}

/// Renders and writes the preview, returning the number of bytes written.
pub fn write_preview(
    assets_dir: &Path,
    request: &CertificateRequest,
    date: NaiveDate,
    output: &Path,
) -> Result<usize> {
    let html = render(assets_dir, request, date)?;
    std::fs::write(output, &html)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    Ok(html.len())
}
