//! # zpl-writer
//!
//! ZPL II label writer - builds label command streams for Zebra-compatible
//! thermal label printers.
//!
//! ## Scope
//!
//! This crate handles HOW a label is encoded and delivered:
//! - ZPL directive building in millimetres (text, shapes, QR codes, images)
//! - Unit conversion to printer dots and range clamping
//! - Image to `^GF` graphic field conversion (feature `image`)
//! - Network printing (TCP port 9100)
//! - PDF previews through the Labelary render service
//!
//! Label layout (WHAT to print) stays in application code.
//!
//! ## Example
//!
//! ```ignore
//! use zpl_writer::{ZplConfig, ZplWriter};
//!
//! let config = ZplConfig::new(None, Some(100.0), Some(50.0), Some(8.0));
//! let mut zpl = ZplWriter::new(config);
//! zpl.font(5.0, None, 0.0, '0', false);
//! zpl.text("SHIP TO", 5.0, 5.0);
//! zpl.graphic_box(2.0, 2.0, 96.0, 46.0, 0.5, 0);
//! zpl.qrcode(70.0, 10.0, &serde_json::json!({"order": 1042}), Some(4));
//!
//! // Send to network printer
//! zpl.print("192.168.1.50", 9100).await?;
//! ```

#[cfg(feature = "image")]
mod bitmap;
mod config;
mod error;
mod font;
mod printer;
mod render;
mod units;
mod writer;

// Re-exports
pub use config::ZplConfig;
pub use error::{ImageError, ZplError, ZplResult};
pub use font::{FontSelector, Justify, Orientation};
pub use printer::{DEFAULT_PORT, NetworkPrinter, Printer};
pub use render::{LabelRenderer, LabelaryRenderer};
pub use units::{MAX_DOTS, coordinates, dots};
pub use writer::ZplWriter;

#[cfg(feature = "image")]
pub use bitmap::{GraphicField, decode as decode_image, fetch_image};
