//! Default placeholder image, substituted whenever a fetch or transform
//! cannot be completed.

use anyhow::{Context, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

const PLACEHOLDER_SIDE: u32 = 64;
const PLACEHOLDER_GRAY: u8 = 0xd0;
const PLACEHOLDER_QUALITY: u8 = 80;

/// Encode the built-in placeholder: a flat gray JPEG.
///
/// Built once at startup and carried as read-only state for the rest of the
/// run; callers may substitute their own bytes (e.g. a branded "image not
/// available" file) instead.
pub fn default_placeholder() -> Result<Bytes> {
    let img = RgbImage::from_pixel(
        PLACEHOLDER_SIDE,
        PLACEHOLDER_SIDE,
        Rgb([PLACEHOLDER_GRAY, PLACEHOLDER_GRAY, PLACEHOLDER_GRAY]),
    );

    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, PLACEHOLDER_QUALITY);
    encoder
        .encode_image(&img)
        .context("Failed to encode placeholder image")?;

    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_a_valid_nonempty_jpeg() {
        let bytes = default_placeholder().unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }
}
