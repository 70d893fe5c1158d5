//! Ambient backdrop colors for detail pages, extracted from artwork.
//!
//! The image is scaled down to a 16x16 thumbnail, reduced to four colors by
//! median cut and the three darkest become a layered gradient background.

pub mod gradient;
pub mod palette;

pub use palette::Rgb;

use image::imageops::FilterType;
use image::ImageReader;
use std::io::Cursor;

/// Edge length of the analysis thumbnail. Primary colors survive the scale
/// down; detail does not matter here.
const SAMPLE_SIZE: u32 = 16;
/// Median-cut depth: four buckets.
const PALETTE_DEPTH: u32 = 2;

/// The three backdrop colors of one artwork, darkest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backdrop {
    colors: [Rgb; 3],
}

impl Backdrop {
    /// Extracts a backdrop from an encoded image. `None` when the bytes do
    /// not decode as an image or yield fewer than three colors.
    pub fn from_image_bytes(bytes: &[u8]) -> Option<Self> {
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .ok()?
            .decode()
            .ok()?;
        let sample = image
            .resize_exact(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle)
            .to_rgba8();
        Self::from_rgba(sample.as_raw())
    }

    /// Extracts a backdrop from raw RGBA data.
    pub fn from_rgba(rgba: &[u8]) -> Option<Self> {
        let palette = palette::quantize(rgba, PALETTE_DEPTH);
        match palette[..] {
            [first, second, third, ..] => Some(Self {
                colors: [first, second, third],
            }),
            _ => None,
        }
    }

    pub fn colors(&self) -> [Rgb; 3] {
        self.colors
    }

    /// The CSS background for these colors.
    pub fn css(&self) -> String {
        gradient::backdrop_css(self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    fn encoded_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_uniform_image_yields_its_color() {
        let bytes = encoded_png(64, 48, [200, 30, 40, 255]);
        let backdrop = Backdrop::from_image_bytes(&bytes).unwrap();
        let expected = Rgb {
            r: 200,
            g: 30,
            b: 40,
        };
        assert_eq!(backdrop.colors(), [expected, expected, expected]);
    }

    #[test]
    fn test_undecodable_bytes_yield_no_backdrop() {
        assert_eq!(Backdrop::from_image_bytes(b"not an image"), None);
        assert_eq!(Backdrop::from_image_bytes(&[]), None);
    }

    #[test]
    fn test_empty_rgba_yields_no_backdrop() {
        assert_eq!(Backdrop::from_rgba(&[]), None);
    }

    #[test]
    fn test_css_renders_three_layers() {
        let bytes = encoded_png(16, 16, [0, 0, 255, 255]);
        let backdrop = Backdrop::from_image_bytes(&bytes).unwrap();
        assert_eq!(
            backdrop.css(),
            "linear-gradient(15deg,rgba(0,0,255,0.8),rgba(0,0,255,0) 70%),\
             linear-gradient(255deg,rgba(0,0,255,0.8),rgba(0,0,255,0) 70%),\
             linear-gradient(135deg,rgba(0,0,255,0.8),rgba(0,0,255,0) 70%)"
        );
    }
}
