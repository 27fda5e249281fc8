//! HTML to PDF conversion through an out-of-process rendering engine.
//!
//! The engine is a scoped resource: [`render_pdf`] launches one session per
//! call and closes it before returning, on success, on failure and on
//! timeout.

pub mod chromium;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

pub use chromium::ChromiumEngine;

/// Default bound on launching the engine.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on producing the PDF once the engine is up.
pub const DEFAULT_PRINT_TIMEOUT: Duration = Duration::from_secs(60);

/// Step of a render session that can time out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Launch,
    Print,
}

impl fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderPhase::Launch => f.write_str("launch"),
            RenderPhase::Print => f.write_str("print"),
        }
    }
}

/// Errors raised by the rendering engine.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to render page: {0}")]
    Page(String),

    #[error("Browser {phase} timed out after {secs}s")]
    Timeout { phase: RenderPhase, secs: u64 },

    #[error("Browser produced an empty PDF")]
    EmptyDocument,

    #[error("Failed to close browser: {0}")]
    Close(String),
}

/// Paper dimensions in inches, portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl PaperSize {
    pub const A4: PaperSize = PaperSize {
        width_in: 8.27,
        height_in: 11.69,
    };
}

/// Print settings handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub paper: PaperSize,
    pub landscape: bool,
    pub print_background: bool,
    /// Let CSS `@page { size }` override `paper`.
    pub prefer_css_page_size: bool,
}

impl Default for PdfOptions {
    /// A4, landscape, with backgrounds, honouring CSS page size.
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            landscape: true,
            print_background: true,
            prefer_css_page_size: true,
        }
    }
}

/// Timeouts applied around the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    pub launch: Duration,
    pub print: Duration,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            launch: DEFAULT_LAUNCH_TIMEOUT,
            print: DEFAULT_PRINT_TIMEOUT,
        }
    }
}

/// Launches render sessions.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderError>;
}

/// One running engine instance.
#[async_trait]
pub trait RenderSession: Send {
    /// Loads `html` into a fresh page and prints it.
    async fn print_pdf(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError>;

    /// Shuts the engine down. Called exactly once per session.
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Renders `html` to PDF bytes in a dedicated engine session.
///
/// The session is closed before this returns whatever the outcome of the
/// print. A failure to close after a successful print is logged, not
/// returned, since the document is already complete.
pub async fn render_pdf(
    engine: &dyn RenderEngine,
    html: &str,
    options: &PdfOptions,
    limits: &RenderLimits,
) -> Result<Vec<u8>, RenderError> {
    let mut session = match tokio::time::timeout(limits.launch, engine.launch()).await {
        Ok(session) => session?,
        Err(_) => {
            return Err(RenderError::Timeout {
                phase: RenderPhase::Launch,
                secs: limits.launch.as_secs(),
            })
        }
    };

    let printed = match tokio::time::timeout(limits.print, session.print_pdf(html, options)).await
    {
        Ok(printed) => printed,
        Err(_) => Err(RenderError::Timeout {
            phase: RenderPhase::Print,
            secs: limits.print.as_secs(),
        }),
    };

    if let Err(e) = session.close().await {
        tracing::warn!("Render session did not close cleanly: {}", e);
    }

    let pdf = printed?;
    if pdf.is_empty() {
        return Err(RenderError::EmptyDocument);
    }

    Ok(pdf)
}
