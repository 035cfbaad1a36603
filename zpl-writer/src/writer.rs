//! ZPL command builder
//!
//! Provides a chaining API that accumulates ZPL II directives in device
//! units and exports the complete `^XA ... ^XZ` label.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info, instrument};

use crate::config::ZplConfig;
use crate::error::ZplResult;
use crate::font::{FontSelector, Justify, Orientation};
use crate::printer::{NetworkPrinter, Printer};
use crate::render::{LabelRenderer, LabelaryRenderer};
use crate::units::{
    self, MAX_CURVE_DOTS, MAX_DOTS, MAX_ROUNDING, MIN_CURVE_EXTENT, MIN_CURVE_STROKE,
};

/// Start of label followed by a bare `^MT` (media type left at the printer default)
const LABEL_START: &str = "^XA^MT";
/// End of label
const LABEL_END: &str = "^XZ";
/// Field reverse-print prefix
const REVERSE: &str = "^FR";

/// ZPL label builder
///
/// All positions and sizes are millimetres unless a parameter says dots.
/// The current font and reverse-video modifiers are prefixed to every
/// text field added after they are set.
///
/// A writer is meant to be owned by a single caller; share it across
/// threads only behind your own lock.
#[derive(Debug, Clone)]
pub struct ZplWriter {
    attrib: Vec<String>,
    stream: Vec<String>,
    font: Option<FontSelector>,
    reverse: bool,
    config: ZplConfig,
}

impl ZplWriter {
    /// Create an empty writer holding its own copy of `config`
    pub fn new(config: ZplConfig) -> Self {
        Self {
            attrib: Vec::new(),
            stream: Vec::new(),
            font: None,
            reverse: false,
            config,
        }
    }

    /// Get the writer's configuration
    pub fn config(&self) -> &ZplConfig {
        &self.config
    }

    /// Body directives added so far, in draw order
    pub fn directives(&self) -> &[String] {
        &self.stream
    }

    /// Current font selector, if one was set
    pub fn current_font(&self) -> Option<&FontSelector> {
        self.font.as_ref()
    }

    /// Whether reverse video is active for new fields
    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    // === Stream Control ===

    /// Drop all body directives; label settings and modifiers are kept
    pub fn clear(&mut self) -> &mut Self {
        self.stream.clear();
        self
    }

    /// Append a raw directive verbatim
    pub fn add(&mut self, command: impl Into<String>) -> &mut Self {
        self.stream.push(command.into());
        self
    }

    /// Convert a left/top pair in millimetres to device coordinates
    pub fn coordinates(&self, left: f64, top: f64) -> (u32, u32) {
        units::coordinates(left, top, self.config.dpmm())
    }

    // === Modifiers ===

    /// Print following fields white on black
    pub fn to_reverse(&mut self) -> &mut Self {
        self.reverse = true;
        self
    }

    /// Print following fields normally
    pub fn to_normal(&mut self) -> &mut Self {
        self.reverse = false;
        self
    }

    /// Select the font for following text fields
    ///
    /// `flip` is an angle in degrees, bucketed to the nearest quarter turn
    /// below it. With `is_default` the font is also emitted as `^CF`
    /// right away.
    pub fn font(
        &mut self,
        height: f64,
        width: Option<f64>,
        flip: f64,
        code: char,
        is_default: bool,
    ) -> &mut Self {
        let dpmm = self.config.dpmm();
        let selector = FontSelector {
            code,
            orientation: Orientation::from_degrees(flip),
            height: units::dots(height, dpmm, 0, MAX_DOTS),
            width: width.map(|w| units::dots(w, dpmm, 0, MAX_DOTS)),
        };
        if is_default {
            self.stream.push(selector.default_directive());
        }
        self.font = Some(selector);
        self
    }

    fn field_origin(&self, left: f64, top: f64) -> String {
        let (left, top) = self.coordinates(left, top);
        format!("^FO{},{}", left, top)
    }

    fn reverse_prefix(&self) -> &'static str {
        if self.reverse { REVERSE } else { "" }
    }

    fn text_prefix(&self) -> String {
        let font = self.font.as_ref().map(|f| f.to_string()).unwrap_or_default();
        format!("{}{}", font, self.reverse_prefix())
    }

    // === Text ===

    /// Place a single text field
    ///
    /// `data` is written as-is; escaping `^` and `~` is up to the caller.
    pub fn text(&mut self, data: &str, left: f64, top: f64) -> &mut Self {
        let command = format!(
            "{}{}^FD{}^FS",
            self.field_origin(left, top),
            self.text_prefix(),
            data
        );
        self.stream.push(command);
        self
    }

    /// Place a wrapped text block `width` millimetres wide
    ///
    /// `justify` is one of left, center, right, justify (or L/C/R/J), in any
    /// case. An unknown code is rejected and nothing is added.
    pub fn textblock(
        &mut self,
        left: f64,
        top: f64,
        data: &str,
        width: f64,
        justify: &str,
        max_lines: u32,
    ) -> ZplResult<&mut Self> {
        let justify: Justify = justify.parse()?;
        let width = units::dots(width, self.config.dpmm(), 0, MAX_DOTS);
        let command = format!(
            "{}{}^FB{},{},0,{},0^FD{}^FS",
            self.field_origin(left, top),
            self.text_prefix(),
            width,
            max_lines,
            justify.code(),
            data
        );
        self.stream.push(command);
        Ok(self)
    }

    // === Shapes ===

    /// Draw an ellipse; `thick` is the stroke in dots
    pub fn ellipse(&mut self, left: f64, top: f64, width: f64, height: f64, thick: u32) -> &mut Self {
        let dpmm = self.config.dpmm();
        let width = units::dots(width, dpmm, MIN_CURVE_EXTENT, MAX_CURVE_DOTS);
        let height = units::dots(height, dpmm, MIN_CURVE_EXTENT, MAX_CURVE_DOTS);
        let thick = thick.clamp(MIN_CURVE_STROKE, MAX_CURVE_DOTS);
        let command = format!(
            "{}{}^GE{},{},{},B^FS",
            self.field_origin(left, top),
            self.reverse_prefix(),
            width,
            height,
            thick
        );
        self.stream.push(command);
        self
    }

    /// Draw a circle; `thick` is the stroke in dots
    pub fn circle(&mut self, left: f64, top: f64, diameter: f64, thick: u32) -> &mut Self {
        let diameter = units::dots(diameter, self.config.dpmm(), MIN_CURVE_EXTENT, MAX_CURVE_DOTS);
        let thick = thick.clamp(MIN_CURVE_STROKE, MAX_CURVE_DOTS);
        let command = format!(
            "{}{}^GC{},{},B^FS",
            self.field_origin(left, top),
            self.reverse_prefix(),
            diameter,
            thick
        );
        self.stream.push(command);
        self
    }

    /// Draw a box with an optional corner rounding of 0-8
    ///
    /// Width and height never drop below the stroke, so a zero-sized box
    /// still prints as a solid square of the stroke's size.
    pub fn graphic_box(
        &mut self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        thick: f64,
        rounding: u32,
    ) -> &mut Self {
        let dpmm = self.config.dpmm();
        let thick = units::box_stroke(thick, dpmm);
        let width = units::dots(width, dpmm, thick, MAX_DOTS);
        let height = units::dots(height, dpmm, thick, MAX_DOTS);
        let rounding = rounding.min(MAX_ROUNDING);
        let command = format!(
            "{}{}^GB{},{},{},B,{}^FS",
            self.field_origin(left, top),
            self.reverse_prefix(),
            width,
            height,
            thick,
            rounding
        );
        self.stream.push(command);
        self
    }

    /// Draw a horizontal line `thick` millimetres high
    pub fn hline(&mut self, left: f64, top: f64, width: f64, thick: f64) -> &mut Self {
        let dpmm = self.config.dpmm();
        let thick = units::box_stroke(thick, dpmm);
        let width = units::dots(width, dpmm, thick, MAX_DOTS);
        let command = format!(
            "{}{}^GB{},{},{},B,0^FS",
            self.field_origin(left, top),
            self.reverse_prefix(),
            width,
            thick,
            thick
        );
        self.stream.push(command);
        self
    }

    /// Draw a vertical line `thick` millimetres wide
    pub fn vline(&mut self, left: f64, top: f64, height: f64, thick: f64) -> &mut Self {
        let dpmm = self.config.dpmm();
        let thick = units::box_stroke(thick, dpmm);
        let height = units::dots(height, dpmm, thick, MAX_DOTS);
        let command = format!(
            "{}{}^GB{},{},{},B,0^FS",
            self.field_origin(left, top),
            self.reverse_prefix(),
            thick,
            height,
            thick
        );
        self.stream.push(command);
        self
    }

    // === Barcodes ===

    /// Place a QR code
    ///
    /// `Null` data adds nothing. Strings are encoded as-is, numbers in their
    /// JSON text form, booleans as `True`/`False`, arrays and objects as
    /// compact JSON.
    /// Without `magnify` the printer's default magnification applies.
    pub fn qrcode(&mut self, left: f64, top: f64, data: &Value, magnify: Option<u32>) -> &mut Self {
        let content = match data {
            Value::Null => return self,
            Value::String(s) => s.clone(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            other => other.to_string(),
        };
        let magnify = magnify
            .map(|m| m.clamp(1, 10).to_string())
            .unwrap_or_default();
        let command = format!(
            "{}^BQ,2,{},H^FDQA,{}^FS",
            self.field_origin(left, top),
            magnify,
            content
        );
        self.stream.push(command);
        self
    }

    // === Label Settings ===

    /// Set the default field orientation (`^FW`) and justification 0-2
    pub fn orientation(&mut self, rotate: f64, justify: i64) -> &mut Self {
        let rotate = Orientation::from_degrees(rotate).degrees();
        let justify = justify.clamp(0, 2);
        self.stream.push(format!("^FW{},{}", rotate, justify));
        self
    }

    /// Reverse the whole label (`^LR`)
    pub fn label_reverse(&mut self, reverse: bool) -> &mut Self {
        let flag = if reverse { "Y" } else { "N" };
        self.stream.push(format!("^LR{}", flag));
        self
    }

    /// Set the label length in millimetres (`^LL`)
    pub fn label_length(&mut self, length: f64) -> &mut Self {
        let length = units::dots(length, self.config.dpmm(), 1, MAX_DOTS);
        self.stream.push(format!("^LL{}", length));
        self
    }

    /// Kiosk cut amount (`^CN`): `true` cuts by the set amount
    pub fn cut(&mut self, kiosk_cut_amount: bool) -> &mut Self {
        let flag = if kiosk_cut_amount { "0" } else { "1" };
        self.stream.push(format!("^CN{}", flag));
        self
    }

    /// Interpret field data as UTF-8 (`^CI28`)
    pub fn utf8(&mut self) -> &mut Self {
        self.attrib.push("^CI28".to_string());
        self
    }

    /// Number of copies to print (`^PQ`)
    pub fn quantity(&mut self, copies: u32) -> &mut Self {
        let copies = copies.clamp(1, 99_999_999);
        self.attrib.push(format!("^PQ{}", copies));
        self
    }

    // === Build ===

    /// Assemble the complete label
    pub fn export(&self) -> String {
        let mut out = String::with_capacity(
            LABEL_START.len()
                + LABEL_END.len()
                + self.attrib.iter().chain(&self.stream).map(String::len).sum::<usize>(),
        );
        out.push_str(LABEL_START);
        for part in self.attrib.iter().chain(&self.stream) {
            out.push_str(part);
        }
        out.push_str(LABEL_END);
        out
    }

    // === Output ===

    /// Send the label to a raw TCP printer, usually on port 9100
    ///
    /// Connect and write are each bounded by the configured timeout.
    #[instrument(skip(self), fields(directives = self.stream.len()))]
    pub async fn print(&self, host: &str, port: u16) -> ZplResult<()> {
        let printer = NetworkPrinter::new(host, port)
            .with_timeout(Duration::from_secs(self.config.timeout()));
        self.print_to(&printer).await
    }

    /// Send the label through any printer adapter
    pub async fn print_to<P: Printer>(&self, printer: &P) -> ZplResult<()> {
        let data = self.export();
        printer.print(data.as_bytes()).await.inspect_err(|e| {
            error!(error = %e, "Unable to send label");
        })
    }

    /// Render the label to PDF through the default render service
    pub async fn render_pdf(&self) -> ZplResult<Vec<u8>> {
        self.render_with(&LabelaryRenderer::default()).await
    }

    /// Render the label to PDF through any renderer
    pub async fn render_with<R: LabelRenderer>(&self, renderer: &R) -> ZplResult<Vec<u8>> {
        renderer.render(&self.config, &self.export()).await
    }

    /// Render the label to PDF and write it to `destination`
    #[instrument(skip(self, destination), fields(path = %destination.as_ref().display()))]
    pub async fn saveas(&self, destination: impl AsRef<Path>) -> ZplResult<()> {
        self.saveas_with(&LabelaryRenderer::default(), destination).await
    }

    /// Render through `renderer` and write the PDF to `destination`
    pub async fn saveas_with<R: LabelRenderer>(
        &self,
        renderer: &R,
        destination: impl AsRef<Path>,
    ) -> ZplResult<()> {
        let pdf = self.render_with(renderer).await?;
        tokio::fs::write(destination.as_ref(), &pdf).await?;
        info!(bytes = pdf.len(), "Saved rendered label");
        Ok(())
    }

    /// Render through `renderer` and write the PDF into `sink`
    pub async fn saveas_writer<R, W>(&self, renderer: &R, sink: &mut W) -> ZplResult<()>
    where
        R: LabelRenderer,
        W: tokio::io::AsyncWrite + Unpin,
    {
        use tokio::io::AsyncWriteExt;

        let pdf = self.render_with(renderer).await?;
        sink.write_all(&pdf).await?;
        sink.flush().await?;
        Ok(())
    }
}

impl Default for ZplWriter {
    fn default() -> Self {
        Self::new(ZplConfig::default())
    }
}
