//! Image to `^GF` graphic field conversion
//!
//! The image is:
//! - Resized to the requested size in dots (nearest neighbour)
//! - Flattened onto white (transparent pixels never print)
//! - Converted to grayscale and inverted, so dark pixels become set bits
//! - Thresholded to 1 bit and packed MSB first, each row padded with zeros
//! - Hex encoded as an ASCII `^GFA` field

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Pixel};
use tracing::{error, info, instrument};

use crate::error::ImageError;
use crate::units::MAX_DOTS;
use crate::writer::ZplWriter;

/// Inverted luma at or above this prints a dot
const THRESHOLD: u8 = 128;

/// Alpha below this counts as transparent
const ALPHA_THRESHOLD: u8 = 128;

/// Largest packed field accepted, in bytes
pub const MAX_FIELD_BYTES: u64 = 4 * 1024 * 1024;

/// Packed 1-bit raster ready for `^GF`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicField {
    pub bytes_per_row: u32,
    pub data: Vec<u8>,
}

impl GraphicField {
    /// Pack an already inverted grayscale raster
    pub fn from_inverted(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        let bytes_per_row = w.div_ceil(8);
        let bpr = bytes_per_row as usize;
        let mut data = vec![0u8; bpr * h as usize];

        for (x, y, px) in img.enumerate_pixels() {
            if px[0] >= THRESHOLD {
                let i = y as usize * bpr + x as usize / 8;
                data[i] |= 1 << (7 - (x % 8));
            }
        }

        Self {
            bytes_per_row,
            data,
        }
    }

    pub fn total_bytes(&self) -> usize {
        self.data.len()
    }

    /// `^GFA` parameters: `hex length,total bytes,bytes per row,hex`
    pub fn payload(&self) -> String {
        let hex = hex::encode_upper(&self.data);
        format!(
            "{},{},{},{}",
            hex.len(),
            self.total_bytes(),
            self.bytes_per_row,
            hex
        )
    }
}

/// Resize `image` to `width` x `height` dots and pack it
pub fn encode(image: &DynamicImage, width: u32, height: u32) -> GraphicField {
    let mut gray = if image.width() == width && image.height() == height {
        flatten(image)
    } else {
        flatten(&image.resize_exact(width, height, FilterType::Nearest))
    };
    imageops::invert(&mut gray);
    GraphicField::from_inverted(&gray)
}

/// Grayscale with transparent pixels mapped to white
fn flatten(image: &DynamicImage) -> GrayImage {
    if !image.color().has_alpha() {
        return image.to_luma8();
    }
    let rgba = image.to_rgba8();
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let px = rgba.get_pixel(x, y);
        if px[3] < ALPHA_THRESHOLD {
            Luma([255])
        } else {
            px.to_luma()
        }
    })
}

/// Download and decode a remote image
#[instrument]
pub async fn fetch_image(url: &str) -> Result<DynamicImage, ImageError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ImageError::Fetch(e.to_string()))?;
    if !response.status().is_success() {
        error!(status = response.status().as_u16(), "Image fetch rejected");
        return Err(ImageError::Fetch(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ImageError::Fetch(e.to_string()))?;
    info!(bytes = bytes.len(), "Image downloaded");
    decode(&bytes)
}

/// Decode an encoded image (PNG, JPEG, ...)
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))
}

fn target_dots(mm: f64, dpmm: f64, axis: &str) -> Result<u32, ImageError> {
    let dots = (mm * dpmm).round();
    if !(1.0..=MAX_DOTS as f64).contains(&dots) {
        return Err(ImageError::Validation(format!(
            "{} of {}mm gives {} dots",
            axis, mm, dots
        )));
    }
    Ok(dots as u32)
}

impl ZplWriter {
    /// Place an image as a graphic field
    ///
    /// `width`/`height` are millimetres. Without a width the image's pixel
    /// width is taken as millimetres; without a height the aspect ratio is
    /// kept. Fields larger than [`MAX_FIELD_BYTES`] packed are rejected.
    /// On error nothing is added.
    #[instrument(skip(self, image), fields(src_w = image.width(), src_h = image.height()))]
    pub fn image(
        &mut self,
        image: &DynamicImage,
        left: f64,
        top: f64,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<&mut Self, ImageError> {
        let (src_w, src_h) = (image.width(), image.height());
        if src_w == 0 || src_h == 0 {
            return Err(ImageError::Validation(format!(
                "empty source image {}x{}",
                src_w, src_h
            )));
        }

        let dpmm = self.config().dpmm();
        let width_mm = width.unwrap_or(src_w as f64);
        let height_mm = height.unwrap_or(width_mm * src_h as f64 / src_w as f64);
        let width = target_dots(width_mm, dpmm, "width")?;
        let height = target_dots(height_mm, dpmm, "height")?;
        let field_bytes = u64::from(width.div_ceil(8)) * u64::from(height);
        if field_bytes > MAX_FIELD_BYTES {
            return Err(ImageError::Validation(format!(
                "{}x{} dots needs {} bytes, limit is {}",
                width, height, field_bytes, MAX_FIELD_BYTES
            )));
        }

        let field = encode(image, width, height);
        let (left, top) = self.coordinates(left, top);
        info!(width, height, bytes = field.total_bytes(), "Encoded graphic field");
        self.add(format!("^FO{},{}^GFA,{}^FS", left, top, field.payload()));
        Ok(self)
    }

    /// Decode an encoded image and place it, see [`ZplWriter::image`]
    pub fn image_bytes(
        &mut self,
        bytes: &[u8],
        left: f64,
        top: f64,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<&mut Self, ImageError> {
        let image = decode(bytes)?;
        self.image(&image, left, top, width, height)
    }

    /// Download an image and place it, see [`ZplWriter::image`]
    pub async fn image_url(
        &mut self,
        url: &str,
        left: f64,
        top: f64,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<&mut Self, ImageError> {
        let image = fetch_image(url).await?;
        self.image(&image, left, top, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZplConfig;
    use image::{Rgba, RgbaImage};

    fn writer(dpmm: f64) -> ZplWriter {
        ZplWriter::new(ZplConfig::new(None, None, None, Some(dpmm)))
    }

    fn white(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([255])))
    }

    #[test]
    fn test_white_image_is_all_zero() {
        let (w, h) = (3, 2);
        let mut zpl = writer(8.0);
        zpl.image(&white(w, h), 0.0, 0.0, None, None).unwrap();

        let bpr = (w * 8).div_ceil(8);
        let total = bpr * h * 8;
        let hex = "00".repeat(total as usize);
        assert_eq!(hex.len(), (bpr * h * 8 * 2) as usize);
        assert_eq!(
            zpl.directives(),
            [format!("^FO0,0^GFA,{},{},{},{}^FS", hex.len(), total, bpr, hex)]
        );
    }

    #[test]
    fn test_black_row_padding_is_zero() {
        let black = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 2, Luma([0])));
        let mut zpl = writer(1.0);
        zpl.image(&black, 2.0, 3.0, None, None).unwrap();
        assert_eq!(zpl.directives(), ["^FO2,3^GFA,4,2,1,E0E0^FS"]);
    }

    #[test]
    fn test_msb_first_packing() {
        let img = GrayImage::from_fn(10, 1, |x, _| if x % 2 == 0 { Luma([0]) } else { Luma([255]) });
        let mut gray = img;
        imageops::invert(&mut gray);
        let field = GraphicField::from_inverted(&gray);
        assert_eq!(field.bytes_per_row, 2);
        assert_eq!(field.data, vec![0xAA, 0x80]);
        assert_eq!(field.payload(), "4,2,2,AA80");
    }

    #[test]
    fn test_threshold_midpoint() {
        // luma 127 inverts to 128 and prints, luma 128 inverts to 127 and does not
        let img = GrayImage::from_fn(2, 1, |x, _| Luma([127 + x as u8]));
        let field = encode(&DynamicImage::ImageLuma8(img), 2, 1);
        assert_eq!(field.data, vec![0x80]);
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        let mut zpl = writer(8.0);
        zpl.image(&white(4, 2), 0.0, 0.0, Some(2.0), None).unwrap();
        // 16x8 dots: 2 bytes per row, 16 bytes
        assert!(zpl.directives()[0].starts_with("^FO0,0^GFA,32,16,2,"));
    }

    #[test]
    fn test_explicit_size() {
        let mut zpl = writer(8.0);
        zpl.image(&white(4, 2), 1.0, 1.0, Some(1.0), Some(3.0)).unwrap();
        assert!(zpl.directives()[0].starts_with("^FO8,8^GFA,48,24,1,"));
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut zpl = writer(8.0);
        zpl.text("keep", 0.0, 0.0);
        let result = zpl.image(&DynamicImage::new_luma8(0, 0), 0.0, 0.0, None, None);
        assert!(matches!(result, Err(ImageError::Validation(_))));
        assert_eq!(zpl.directives().len(), 1);
    }

    #[test]
    fn test_zero_target_rejected() {
        let mut zpl = writer(8.0);
        let result = zpl.image(&white(4, 4), 0.0, 0.0, Some(0.0), None);
        assert!(matches!(result, Err(ImageError::Validation(_))));
        assert!(zpl.directives().is_empty());
    }

    #[test]
    fn test_transparent_pixels_print_white() {
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 1, Rgba([0, 0, 0, 0])));
        let mut zpl = writer(1.0);
        zpl.image(&clear, 0.0, 0.0, None, None).unwrap();
        assert_eq!(zpl.directives(), ["^FO0,0^GFA,2,1,1,00^FS"]);
    }

    #[test]
    fn test_alpha_threshold_after_resize() {
        // opaque black on the left half, translucent black on the right
        let img = RgbaImage::from_fn(4, 1, |x, _| {
            if x < 2 { Rgba([0, 0, 0, 255]) } else { Rgba([0, 0, 0, 127]) }
        });
        let field = encode(&DynamicImage::ImageRgba8(img), 8, 2);
        assert_eq!(field.data, vec![0xF0, 0xF0]);
    }

    #[test]
    fn test_oversized_field_rejected() {
        // 4000 px read as mm at 8 dpmm would be 32000x32000 dots
        let mut zpl = writer(8.0);
        let result = zpl.image(&white(4000, 4000), 0.0, 0.0, None, None);
        assert!(matches!(result, Err(ImageError::Validation(_))));
        assert!(zpl.directives().is_empty());
    }

    #[test]
    fn test_undecodable_bytes() {
        let mut zpl = writer(8.0);
        let result = zpl.image_bytes(b"definitely not a png", 0.0, 0.0, None, None);
        assert!(matches!(result, Err(ImageError::Decode(_))));
        assert!(zpl.directives().is_empty());
    }

    #[test]
    fn test_png_bytes() {
        let img = GrayImage::from_pixel(8, 1, Luma([0]));
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut zpl = writer(1.0);
        zpl.image_bytes(&png, 0.0, 0.0, None, None).unwrap();
        assert_eq!(zpl.directives(), ["^FO0,0^GFA,2,1,1,FF^FS"]);
    }
}
