//! Turns a branded URL into a self-contained QR image.
//!
//! Symbol construction is left entirely to the `qrcode` crate. This module only
//! shapes the rendering parameters, rasterizes the module matrix and wraps the
//! result in a `data:` URL that can be embedded without an external fetch.

use crate::error::QrError;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgb, RgbImage};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

pub const DEFAULT_WIDTH: u32 = 300;
pub const DEFAULT_MARGIN: u32 = 2;
/// Pixels per module when the requested width is too small for the symbol.
const FALLBACK_SCALE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor([u8; 3]);

impl HexColor {
    pub const BLACK: HexColor = HexColor([0x00, 0x00, 0x00]);
    pub const WHITE: HexColor = HexColor([0xFF, 0xFF, 0xFF]);

    pub fn rgb(self) -> [u8; 3] {
        self.0
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid color {value:?}, expected #RRGGBB");
        let digits = value.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).map_err(|_| invalid());
        Ok(HexColor([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

impl Serialize for HexColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn from_mime_type(mime_type: &str) -> Option<ImageFormat> {
        [ImageFormat::Png, ImageFormat::Svg]
            .into_iter()
            .find(|format| format.mime_type() == mime_type)
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            _ => Err(format!("Unknown image format: {value}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    pub width: u32,
    pub margin: u32,
    pub dark_color: HexColor,
    pub light_color: HexColor,
    pub format: ImageFormat,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            margin: DEFAULT_MARGIN,
            dark_color: HexColor::BLACK,
            light_color: HexColor::WHITE,
            format: ImageFormat::Png,
        }
    }
}

/// Encodes `text` and returns the image as a base64 `data:` URL.
pub fn encode(text: &str, options: &EncodeOptions) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
        .map_err(|err| QrError::Encoding(err.to_string()))?;
    let matrix = ModuleMatrix::new(&code, options.margin);
    let bytes = match options.format {
        ImageFormat::Png => render_png(&matrix, options)?,
        ImageFormat::Svg => render_svg(&matrix, options).into_bytes(),
    };
    Ok(to_data_url(options.format.mime_type(), &bytes))
}

pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(bytes))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Splits a base64 `data:` URL. Returns `None` for anything else.
pub fn decode_data_url(data_url: &str) -> Option<DataUrl> {
    let (header, payload) = data_url.strip_prefix("data:")?.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    let bytes = BASE64_STANDARD.decode(payload).ok()?;
    Some(DataUrl {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Module grid including the quiet zone.
struct ModuleMatrix {
    modules: Vec<Color>,
    symbol_width: usize,
    margin: usize,
}

impl ModuleMatrix {
    fn new(code: &QrCode, margin: u32) -> Self {
        Self {
            modules: code.to_colors(),
            symbol_width: code.width(),
            margin: margin as usize,
        }
    }

    fn total_width(&self) -> usize {
        self.symbol_width + 2 * self.margin
    }

    /// Whether the module at (`x`, `y`), in quiet-zone coordinates, is dark.
    fn is_dark(&self, x: usize, y: usize) -> bool {
        let inside = |v: usize| v >= self.margin && v < self.margin + self.symbol_width;
        if !inside(x) || !inside(y) {
            return false;
        }
        let index = (y - self.margin) * self.symbol_width + (x - self.margin);
        self.modules[index] == Color::Dark
    }
}

fn render_png(matrix: &ModuleMatrix, options: &EncodeOptions) -> Result<Vec<u8>, QrError> {
    let total = matrix.total_width();
    let requested = options.width as usize;
    let (scale, size) = if requested >= total {
        (requested as f64 / total as f64, options.width)
    } else {
        (FALLBACK_SCALE, (total as f64 * FALLBACK_SCALE) as u32)
    };
    let dark = Rgb(options.dark_color.rgb());
    let light = Rgb(options.light_color.rgb());
    let image = RgbImage::from_fn(size, size, |px, py| {
        let module = |p: u32| ((p as f64 / scale).floor() as usize).min(total - 1);
        if matrix.is_dark(module(px), module(py)) {
            dark
        } else {
            light
        }
    });

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(image.as_raw(), size, size, ColorType::Rgb8)
        .map_err(|err| QrError::Encoding(err.to_string()))?;
    Ok(buffer)
}

fn render_svg(matrix: &ModuleMatrix, options: &EncodeOptions) -> String {
    let total = matrix.total_width();
    let mut path = String::new();
    for y in 0..total {
        for x in 0..total {
            if matrix.is_dark(x, y) {
                let _ = write!(path, "M{x} {y}h1v1h-1z");
            }
        }
    }
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{width}" "#,
            r#"viewBox="0 0 {total} {total}" shape-rendering="crispEdges">"#,
            r#"<rect width="{total}" height="{total}" fill="{light}"/>"#,
            r#"<path fill="{dark}" d="{path}"/></svg>"#
        ),
        width = options.width,
        total = total,
        light = options.light_color,
        dark = options.dark_color,
        path = path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_and_prints_hex_colors() {
        assert_eq!("#000000".parse::<HexColor>(), Ok(HexColor::BLACK));
        assert_eq!("#ffffff".parse::<HexColor>(), Ok(HexColor::WHITE));
        assert_eq!("#1a2B3c".parse::<HexColor>().unwrap().to_string(), "#1A2B3C");
        for invalid in ["000000", "#fff", "#12345g", "#1234567", ""] {
            assert!(invalid.parse::<HexColor>().is_err(), "{invalid:?}");
        }
    }

    #[test]
    fn default_options_match_visual_defaults() {
        let options = EncodeOptions::default();
        assert_eq!(options.width, 300);
        assert_eq!(options.margin, 2);
        assert_eq!(options.dark_color.to_string(), "#000000");
        assert_eq!(options.light_color.to_string(), "#FFFFFF");
        assert_eq!(options.format, ImageFormat::Png);
    }

    fn symbol_width(text: &str) -> usize {
        QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
            .unwrap()
            .width()
    }

    #[test]
    fn encodes_png_data_url_at_requested_width() {
        let data_url = encode("https://a.test/x#Quick_QR", &EncodeOptions::default()).unwrap();
        assert!(data_url.starts_with("data:image/png;base64,"));

        let decoded = decode_data_url(&data_url).unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        let image = image::load_from_memory_with_format(&decoded.bytes, image::ImageFormat::Png)
            .unwrap()
            .to_rgb8();
        assert_eq!(image.dimensions(), (300, 300));
        // Quiet zone corner is light, finder pattern corner is dark.
        assert_eq!(image.get_pixel(0, 0), &Rgb([0xFF, 0xFF, 0xFF]));
        let total = symbol_width("https://a.test/x#Quick_QR") + 4;
        let quiet = (300.0 / total as f64 * 2.0) as u32 + 1;
        assert_eq!(image.get_pixel(quiet, quiet), &Rgb([0x00, 0x00, 0x00]));
    }

    #[test]
    fn small_width_falls_back_to_fixed_scale() {
        let options = EncodeOptions {
            width: 10,
            ..EncodeOptions::default()
        };
        let decoded = decode_data_url(&encode("https://a.test/x", &options).unwrap()).unwrap();
        let image = image::load_from_memory(&decoded.bytes).unwrap();
        let total = symbol_width("https://a.test/x") + 4;
        assert_eq!(image.width() as usize, total * 4);
    }

    #[test]
    fn applies_custom_colors() {
        let options = EncodeOptions {
            dark_color: "#FF0000".parse().unwrap(),
            light_color: "#00FF00".parse().unwrap(),
            ..EncodeOptions::default()
        };
        let decoded = decode_data_url(&encode("https://a.test/x", &options).unwrap()).unwrap();
        let image = image::load_from_memory(&decoded.bytes).unwrap().to_rgb8();
        assert_eq!(image.get_pixel(0, 0), &Rgb([0x00, 0xFF, 0x00]));
    }

    #[test]
    fn encodes_svg_data_url() {
        let options = EncodeOptions {
            format: ImageFormat::Svg,
            ..EncodeOptions::default()
        };
        let decoded = decode_data_url(&encode("https://a.test/x", &options).unwrap()).unwrap();
        assert_eq!(decoded.mime_type, "image/svg+xml");
        let svg = String::from_utf8(decoded.bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="300""#));
        let total = symbol_width("https://a.test/x") + 4;
        assert!(svg.contains(&format!(r#"viewBox="0 0 {total} {total}""#)));
        assert!(svg.contains(r##"fill="#000000""##));
    }

    #[test]
    fn oversized_payload_is_an_encoding_error() {
        let text = format!("https://a.test/{}", "x".repeat(4000));
        let err = encode(&text, &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, QrError::Encoding(_)));
    }

    #[test]
    fn rejects_non_data_urls() {
        assert_eq!(decode_data_url("https://a.test/logo.png"), None);
        assert_eq!(decode_data_url("data:image/png,rawbytes"), None);
        assert_eq!(decode_data_url("data:image/png;base64,@@@"), None);
    }
}
