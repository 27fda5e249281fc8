//! Headless Chromium engine driven over the DevTools protocol.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{PdfOptions, RenderEngine, RenderError, RenderSession};

/// Flags for running Chromium inside containers and Lambda sandboxes.
const CHROMIUM_ARGS: &[&str] = &[
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--no-first-run",
    "--no-zygote",
    "--hide-scrollbars",
    "--mute-audio",
];

/// Bound on waiting for the browser process to exit once closed.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Launches a fresh headless Chromium process per session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumEngine {
    executable: Option<PathBuf>,
}

impl ChromiumEngine {
    /// Creates an engine. Without an explicit executable, chromiumoxide
    /// searches the usual install locations.
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder().no_sandbox().args(CHROMIUM_ARGS.iter().copied());
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        builder.build().map_err(RenderError::Launch)
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The handler drives the CDP connection and must be polled for the
        // browser to make progress. It ends when the connection closes.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        tracing::debug!("Browser launched");

        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

fn print_params(options: &PdfOptions) -> PrintToPdfParams {
    PrintToPdfParams {
        landscape: Some(options.landscape),
        print_background: Some(options.print_background),
        prefer_css_page_size: Some(options.prefer_css_page_size),
        paper_width: Some(options.paper.width_in),
        paper_height: Some(options.paper.height_in),
        ..Default::default()
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn print_pdf(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Page(e.to_string()))?;

        page.set_content(html)
            .await
            .map_err(|e| RenderError::Page(e.to_string()))?;

        page.pdf(print_params(options))
            .await
            .map_err(|e| RenderError::Page(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        let closed = self.browser.close().await;

        if closed.is_err() {
            // The CDP connection may already be gone; make sure the process is too.
            if let Some(Err(e)) = self.browser.kill().await {
                tracing::warn!("Failed to kill browser process: {}", e);
            }
        }

        let reaped = reap_within(REAP_TIMEOUT, self.browser.wait()).await;
        match reaped {
            Reaped::Exited => {}
            Reaped::Failed(e) => tracing::warn!("Failed to reap browser process: {}", e),
            Reaped::TimedOut => {
                tracing::warn!(
                    secs = REAP_TIMEOUT.as_secs(),
                    "Browser process did not exit after close, killing it"
                );
                if let Some(Err(e)) = self.browser.kill().await {
                    tracing::warn!("Failed to kill browser process: {}", e);
                }
            }
        }
        self.handler_task.abort();

        closed
            .map(|_| ())
            .map_err(|e| RenderError::Close(e.to_string()))
    }
}

/// Outcome of waiting for the browser process to exit.
#[derive(Debug)]
enum Reaped {
    Exited,
    Failed(io::Error),
    TimedOut,
}

async fn reap_within<F, T>(limit: Duration, wait: F) -> Reaped
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(limit, wait).await {
        Ok(Ok(_)) => Reaped::Exited,
        Ok(Err(e)) => Reaped::Failed(e),
        Err(_) => Reaped::TimedOut,
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
