//! Image inspection and circle marker rendering.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, Rgba};
use imageproc::drawing::draw_hollow_circle_mut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

/// Largest accepted marker radius in pixels.
pub const MAX_MARKER_RADIUS: u32 = 4096;

/// Opaque RGB color used for the marker outline.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarkerColor([u8; 3]);

impl MarkerColor {
    pub const RED: Self = Self([255, 0, 0]);

    pub fn rgb(self) -> [u8; 3] {
        self.0
    }

    fn named(name: &str) -> Option<Self> {
        let rgb = match name {
            "red" => [255, 0, 0],
            "green" => [0, 128, 0],
            "lime" => [0, 255, 0],
            "blue" => [0, 0, 255],
            "yellow" => [255, 255, 0],
            "orange" => [255, 165, 0],
            "magenta" | "fuchsia" => [255, 0, 255],
            "cyan" | "aqua" => [0, 255, 255],
            "white" => [255, 255, 255],
            "black" => [0, 0, 0],
            _ => return None,
        };
        Some(Self(rgb))
    }
}

impl Default for MarkerColor {
    fn default() -> Self {
        Self::RED
    }
}

impl FromStr for MarkerColor {
    type Err = crate::Error;

    /// Accepts a color name (`red`, `blue`, ...) or `#rrggbb`.
    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(crate::Error::InvalidColor(format!(
                    "expected #rrggbb, got {s:?}"
                )));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|e| crate::Error::InvalidColor(format!("{s:?}: {e}")))
            };
            return Ok(Self([channel(0)?, channel(2)?, channel(4)?]));
        }
        Self::named(&s.to_ascii_lowercase())
            .ok_or_else(|| crate::Error::InvalidColor(format!("unknown color name {s:?}")))
    }
}

impl TryFrom<String> for MarkerColor {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        value.parse()
    }
}

impl From<MarkerColor> for String {
    fn from(color: MarkerColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl fmt::Debug for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkerColor({self})")
    }
}

/// Geometry and color of the circle drawn by [`render_marked`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Outer radius in pixels.
    pub radius: u32,
    /// Outline thickness in pixels, growing inward from `radius`.
    pub width: u32,
    pub color: MarkerColor,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 20,
            width: 3,
            color: MarkerColor::RED,
        }
    }
}

/// Natural pixel size of a decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Decode image bytes, guessing the format from the content.
pub fn decode(bytes: &[u8]) -> crate::Result<(DynamicImage, ImageFormat)> {
    let format = image::guess_format(bytes).map_err(|e| crate::Error::Decode(e.to_string()))?;
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| crate::Error::Decode(e.to_string()))?;
    Ok((img, format))
}

/// Decode the image and report its dimensions.
pub fn inspect(bytes: &[u8]) -> crate::Result<Dimensions> {
    let (img, _) = decode(bytes)?;
    let (width, height) = img.dimensions();
    Ok(Dimensions { width, height })
}

/// Pick the encoding for a stored file: its extension when we can write it,
/// otherwise the format the upload was decoded from.
pub fn output_format(filename: &str, source: ImageFormat) -> ImageFormat {
    crate::filename::extension_of(filename)
        .and_then(ImageFormat::from_extension)
        .filter(|f| {
            matches!(
                f,
                ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::Bmp
            )
        })
        .unwrap_or(source)
}

/// Draw the marker onto `img` centered at `(x, y)`.
///
/// The image is normalized to 8-bit RGB, or RGBA when it has alpha and the
/// target format can store it. Coordinates are not bounds-checked; the parts
/// of the circle outside the canvas are simply not drawn.
pub fn draw_marker(
    img: &DynamicImage,
    x: i64,
    y: i64,
    style: &MarkerStyle,
    format: ImageFormat,
) -> DynamicImage {
    let [r, g, b] = style.color.rgb();
    if img.color().has_alpha() && format != ImageFormat::Jpeg {
        let mut canvas = img.to_rgba8();
        draw_ring(&mut canvas, x, y, style, Rgba([r, g, b, 255]));
        DynamicImage::ImageRgba8(canvas)
    } else {
        let mut canvas = img.to_rgb8();
        draw_ring(&mut canvas, x, y, style, Rgb([r, g, b]));
        DynamicImage::ImageRgb8(canvas)
    }
}

// `Canvas` stays out of module scope: `DynamicImage` implements it as well as
// `GenericImageView`, and both define `dimensions`.
fn draw_ring<C>(canvas: &mut C, x: i64, y: i64, style: &MarkerStyle, color: C::Pixel)
where
    C: imageproc::drawing::Canvas,
{
    let (w, h) = canvas.dimensions();
    let radius = i64::from(style.radius.min(MAX_MARKER_RADIUS));

    // Entirely off-canvas: nothing to draw, and keeps the math below in i32 range.
    if x.saturating_add(radius) < 0
        || y.saturating_add(radius) < 0
        || x.saturating_sub(radius) >= i64::from(w)
        || y.saturating_sub(radius) >= i64::from(h)
    {
        return;
    }
    let (Ok(cx), Ok(cy)) = (i32::try_from(x), i32::try_from(y)) else {
        return;
    };

    let rings = i64::from(style.width).min(radius + 1);
    for t in 0..rings {
        draw_hollow_circle_mut(canvas, (cx, cy), (radius - t) as i32, color);
    }
}

/// Encode an image in the given format.
pub fn encode(img: &DynamicImage, format: ImageFormat) -> crate::Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .map_err(|e| crate::Error::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Decode an upload, draw the marker and encode the result for `output_name`.
pub fn render_marked(
    bytes: &[u8],
    output_name: &str,
    x: i64,
    y: i64,
    style: &MarkerStyle,
) -> crate::Result<Vec<u8>> {
    let (img, source_format) = decode(bytes)?;
    let format = output_format(output_name, source_format);
    let marked = draw_marker(&img, x, y, style, format);
    encode(&marked, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage, RgbaImage};

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        encode(&img, ImageFormat::Png).unwrap()
    }

    fn white_rgb(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([255, 255, 255])))
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("red".parse::<MarkerColor>().unwrap().rgb(), [255, 0, 0]);
        assert_eq!("Blue".parse::<MarkerColor>().unwrap().rgb(), [0, 0, 255]);
        assert_eq!(
            "#10ff2a".parse::<MarkerColor>().unwrap().rgb(),
            [0x10, 0xff, 0x2a]
        );
        assert!("#12345".parse::<MarkerColor>().is_err());
        assert!("chartreuse-ish".parse::<MarkerColor>().is_err());
    }

    #[test]
    fn test_color_serde_uses_hex() {
        let color: MarkerColor = serde_json::from_str("\"blue\"").unwrap();
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#0000ff\"");
    }

    #[test]
    fn test_inspect_reports_dimensions() {
        let bytes = png_bytes(white_rgb(64, 48));
        assert_eq!(
            inspect(&bytes).unwrap(),
            Dimensions {
                width: 64,
                height: 48
            }
        );
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        let err = inspect(b"definitely not an image").unwrap_err();
        assert!(matches!(err, crate::Error::Decode(_)));
    }

    #[test]
    fn test_marker_outline_is_drawn() {
        let style = MarkerStyle::default();
        let marked = draw_marker(&white_rgb(100, 100), 50, 50, &style, ImageFormat::Png);
        let rgb = marked.to_rgb8();

        // Point on the outer ring, directly right of center.
        assert_eq!(rgb.get_pixel(70, 50), &Rgb([255, 0, 0]));
        // Center and far corner stay untouched.
        assert_eq!(rgb.get_pixel(50, 50), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_marker_off_canvas_is_noop() {
        let style = MarkerStyle::default();
        let src = white_rgb(30, 30);
        for (x, y) in [(-500, -500), (10_000, 5), (i64::MAX, i64::MIN)] {
            let marked = draw_marker(&src, x, y, &style, ImageFormat::Png);
            assert_eq!(marked.to_rgb8(), src.to_rgb8());
        }
    }

    #[test]
    fn test_marker_partially_off_canvas() {
        let style = MarkerStyle::default();
        let marked = draw_marker(&white_rgb(40, 40), -10, 20, &style, ImageFormat::Png);
        assert_eq!(marked.dimensions(), (40, 40));
        assert_eq!(marked.to_rgb8().get_pixel(10, 20), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_grayscale_is_normalized_to_rgb() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, Luma([200])));
        let bytes = png_bytes(gray);
        let out = render_marked(&bytes, "gray_marked.png", 25, 25, &MarkerStyle::default())
            .unwrap();
        let (decoded, format) = decode(&out).unwrap();
        assert_eq!(format, ImageFormat::Png);
        assert_eq!(decoded.dimensions(), (50, 50));
        assert!(decoded.color().has_color());
    }

    #[test]
    fn test_alpha_is_kept_for_png() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 0])));
        let out = render_marked(
            &png_bytes(rgba),
            "clear_marked.png",
            10,
            10,
            &MarkerStyle::default(),
        )
        .unwrap();
        let (decoded, _) = decode(&out).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_output_format_follows_extension() {
        assert_eq!(
            output_format("a_marked.jpg", ImageFormat::Png),
            ImageFormat::Jpeg
        );
        assert_eq!(output_format("a_marked", ImageFormat::Gif), ImageFormat::Gif);
        assert_eq!(
            output_format("a_marked.tiff", ImageFormat::Png),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_jpeg_roundtrip_keeps_dimensions() {
        let jpeg = encode(&white_rgb(33, 17), ImageFormat::Jpeg).unwrap();
        let out = render_marked(&jpeg, "photo_marked.jpg", 5, 5, &MarkerStyle::default()).unwrap();
        assert_eq!(inspect(&out).unwrap(), Dimensions { width: 33, height: 17 });
    }
}
