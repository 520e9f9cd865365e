//! Decoded tile rasters and the `image`-backed decoder.

use std::sync::Arc;

#[cfg(feature = "render")]
use crate::{traits::TileDecoder, TileError};

/// A decoded RGBA8 tile raster
#[derive(Clone, PartialEq, Eq)]
pub struct TileImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<Vec<u8>>,
}

impl TileImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba: Arc::new(rgba),
        }
    }

    pub fn byte_len(&self) -> usize {
        self.rgba.len()
    }
}

impl std::fmt::Debug for TileImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Decodes PNG/JPEG/WebP/... payloads with the `image` crate
#[cfg(feature = "render")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

#[cfg(feature = "render")]
impl TileDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TileImage, TileError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| TileError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(TileImage::new(width, height, rgba.into_raw()))
    }
}

#[cfg(all(test, feature = "render"))]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let image = ImageDecoder.decode(&png_bytes(4, 2)).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.byte_len(), 4 * 2 * 4);
        assert_eq!(&image.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        match ImageDecoder.decode(b"definitely not a png") {
            Err(TileError::Decode(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
