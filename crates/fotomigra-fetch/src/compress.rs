//! JPEG re-compression for watermarked images.

use anyhow::{Context, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;

/// Decode `data`, force RGB color mode, and re-encode as JPEG at `quality`.
///
/// The watermark service returns images noticeably larger than the input,
/// so the pipeline re-encodes them at a fixed low quality.
pub fn recompress_jpeg(data: &[u8], quality: u8) -> Result<Bytes> {
    let img = image::load_from_memory(data).context("Failed to decode image")?;
    // JPEG has no alpha channel; flatten whatever mode the service returned.
    let rgb = img.to_rgb8();

    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .encode_image(&rgb)
        .context("Failed to encode JPEG")?;

    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_with_alpha() -> Vec<u8> {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 200, 30, 128]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn recompress_forces_rgb_jpeg() {
        let out = recompress_jpeg(&png_with_alpha(), 20).unwrap();
        assert!(!out.is_empty());

        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(
            image::guess_format(&out).unwrap(),
            image::ImageFormat::Jpeg
        );
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn recompress_rejects_garbage() {
        assert!(recompress_jpeg(b"not an image", 20).is_err());
    }
}
