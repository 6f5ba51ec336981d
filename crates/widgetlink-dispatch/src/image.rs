// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Widget image payloads: base64 text from the app layer, validated as a
// decodable picture before any view is touched.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use widgetlink_core::error::{Result, WidgetError};
use widgetlink_core::types::WidgetImage;

/// Decode a base64 image argument.
///
/// An empty string means "no image". Whitespace (line-wrapped base64) is
/// ignored.
pub fn decode_image(encoded: &str) -> Result<Option<WidgetImage>> {
    let compact: String = encoded.split_whitespace().collect();
    if compact.is_empty() {
        return Ok(None);
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| WidgetError::ImageDecodeFailed(format!("invalid base64: {e}")))?;
    let picture = image::load_from_memory(&bytes)
        .map_err(|e| WidgetError::ImageDecodeFailed(e.to_string()))?;

    debug!(
        width = picture.width(),
        height = picture.height(),
        bytes = bytes.len(),
        "widget image decoded"
    );
    Ok(Some(WidgetImage {
        width: picture.width(),
        height: picture.height(),
        encoded: bytes,
    }))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbaImage};

    use super::*;

    fn png_base64(width: u32, height: u32) -> String {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        STANDARD.encode(bytes)
    }

    #[test]
    fn decodes_png() {
        let image = decode_image(&png_base64(3, 2))
            .expect("decode")
            .expect("image present");
        assert_eq!((image.width, image.height), (3, 2));
        assert!(image.encoded.starts_with(b"\x89PNG"));
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let encoded = png_base64(1, 1);
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let wrapped = format!("{head}\n{tail}\n");
        assert!(decode_image(&wrapped).expect("decode").is_some());
    }

    #[test]
    fn empty_means_no_image() {
        assert_eq!(decode_image("").expect("decode"), None);
        assert_eq!(decode_image("  \n").expect("decode"), None);
    }

    #[test]
    fn bad_base64_fails() {
        let err = decode_image("not base64!").expect_err("must fail");
        assert!(matches!(err, WidgetError::ImageDecodeFailed(_)));
    }

    #[test]
    fn non_image_bytes_fail() {
        let err = decode_image(&STANDARD.encode(b"plain text, not a picture"))
            .expect_err("must fail");
        assert!(matches!(err, WidgetError::ImageDecodeFailed(_)));
    }
}
