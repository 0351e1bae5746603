//! JPEG frame decoding for the video panel.

/// A decoded frame ready for texture upload.
#[derive(Debug)]
pub struct VideoFrameImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// Decodes one MJPEG part into RGBA pixels. Corrupt frames happen when the
/// stream reconnects mid-part, so failures are reported rather than fatal.
pub fn decode_frame(bytes: &[u8]) -> Result<VideoFrameImage, String> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| format!("failed to decode video frame: {err}"))?;
    let rgba = image.to_rgba8();
    Ok(VideoFrameImage {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    #[test]
    fn decodes_a_jpeg_frame_into_rgba_pixels() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30])));
        let mut encoded = Vec::new();
        source
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
            .expect("encode");

        let frame = decode_frame(&encoded).expect("decode");
        assert_eq!(frame.width, 4);
        assert_eq!(frame.height, 3);
        assert_eq!(frame.rgba.len(), 4 * 3 * 4);
    }

    #[test]
    fn rejects_truncated_frame_bytes() {
        let err = decode_frame(&[0xff, 0xd8, 0x00]).expect_err("must fail");
        assert!(err.contains("decode"));
    }
}
