//! Label and device configuration

use serde::{Deserialize, Serialize};

/// Default I/O timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 10;
/// Default label width in millimetres
pub const DEFAULT_WIDTH: f64 = 4.0;
/// Default label height in millimetres
pub const DEFAULT_HEIGHT: f64 = 6.0;
/// Default resolution (8 dpmm = 203 dpi)
pub const DEFAULT_DPMM: f64 = 8.0;

/// Printer configuration shared by a writer, its transport and its renderer
///
/// Every field is clamped on construction and there are no setters, so a
/// value always holds in-range settings. Copies are independent values.
///
/// # Environment variables
///
/// | Variable | Default | Range |
/// |----------|---------|-------|
/// | ZPL_TIMEOUT | 10 | 1..=500 seconds |
/// | ZPL_WIDTH | 4 | 1..=100 mm |
/// | ZPL_HEIGHT | 6 | 1..=100 mm |
/// | ZPL_DPMM | 8 | 1..=100 dots/mm |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct ZplConfig {
    timeout: u64,
    width: f64,
    height: f64,
    dpmm: f64,
}

impl ZplConfig {
    /// Build a configuration; `None` or non-finite inputs take the default
    pub fn new(
        timeout: Option<u64>,
        width: Option<f64>,
        height: Option<f64>,
        dpmm: Option<f64>,
    ) -> Self {
        Self {
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT).clamp(1, 500),
            width: finite_or(width, DEFAULT_WIDTH).clamp(1.0, 100.0),
            height: finite_or(height, DEFAULT_HEIGHT).clamp(1.0, 100.0),
            dpmm: finite_or(dpmm, DEFAULT_DPMM).clamp(1.0, 100.0),
        }
    }

    /// Load configuration from `ZPL_*` environment variables
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::new(
            env_parse("ZPL_TIMEOUT"),
            env_parse("ZPL_WIDTH"),
            env_parse("ZPL_HEIGHT"),
            env_parse("ZPL_DPMM"),
        )
    }

    /// I/O timeout in seconds
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Label width in millimetres
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Label height in millimetres
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Device dots per millimetre
    pub fn dpmm(&self) -> f64 {
        self.dpmm
    }
}

impl Default for ZplConfig {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Unvalidated on-disk form; every field optional
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    timeout: Option<u64>,
    width: Option<f64>,
    height: Option<f64>,
    dpmm: Option<f64>,
}

impl From<RawConfig> for ZplConfig {
    fn from(raw: RawConfig) -> Self {
        Self::new(raw.timeout, raw.width, raw.height, raw.dpmm)
    }
}
