use anyhow::{Context, Result};
use image::{codecs::jpeg::JpegEncoder, DynamicImage};

pub fn encode_jpeg(frame: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = frame.to_rgb8();
    let mut buffer = Vec::with_capacity(rgb.as_raw().len() / 8);
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .encode_image(&rgb)
        .context("jpeg encoding failed")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    #[test]
    fn encodes_rgba_frames_as_decodable_jpeg() {
        let frame =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 8, Rgba([200, 30, 30, 255])));
        let bytes = encode_jpeg(&frame, 95).unwrap();

        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
