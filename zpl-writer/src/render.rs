//! Remote label rendering
//!
//! Labelary (a third-party service, not affiliated with this crate) turns a
//! ZPL label into a PDF for previewing without a printer.

use std::time::Duration;

use tracing::{error, info, instrument};

use crate::config::ZplConfig;
use crate::error::{ZplError, ZplResult};

/// Public Labelary API
pub const LABELARY_URL: &str = "http://api.labelary.com";

/// Default render request timeout
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for label renderers
#[allow(async_fn_in_trait)]
pub trait LabelRenderer {
    /// Render `zpl` for the device described by `config`, returning PDF bytes
    async fn render(&self, config: &ZplConfig, zpl: &str) -> ZplResult<Vec<u8>>;
}

/// HTTP client for the Labelary render API
#[derive(Debug, Clone)]
pub struct LabelaryRenderer {
    base_url: String,
    timeout: Duration,
}

impl LabelaryRenderer {
    /// Create a renderer against `base_url` (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Endpoint for one label of `config`'s resolution and size
    ///
    /// The service only takes whole numbers, so values are truncated.
    pub fn endpoint(&self, config: &ZplConfig) -> String {
        format!(
            "{}/v1/printers/{}dpmm/labels/{}x{}/0/",
            self.base_url,
            config.dpmm() as u32,
            config.width() as u32,
            config.height() as u32
        )
    }
}

impl Default for LabelaryRenderer {
    fn default() -> Self {
        Self::new(LABELARY_URL)
    }
}

impl LabelRenderer for LabelaryRenderer {
    #[instrument(skip(self, config, zpl), fields(zpl_len = zpl.len()))]
    async fn render(&self, config: &ZplConfig, zpl: &str) -> ZplResult<Vec<u8>> {
        let url = self.endpoint(config);
        info!(url = %url, "Rendering label");

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/pdf")
            .body(zpl.to_string())
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Render service rejected label");
            return Err(ZplError::Render {
                status: status.as_u16(),
                body,
            });
        }

        let pdf = response.bytes().await?;
        info!(bytes = pdf.len(), "Label rendered");
        Ok(pdf.to_vec())
    }
}
