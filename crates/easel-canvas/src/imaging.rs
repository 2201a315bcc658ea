//! Image decoding and upload normalization

use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::error::{Error, Result};

/// Decode any supported raster format into RGBA pixels
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| Error::image_load(format!("decode failed: {e}")))
}

/// Encode RGBA pixels as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| Error::Internal(format!("png encoding failed: {e}")))?;
    Ok(out.into_inner())
}

/// Decode an uploaded file, resize it to the target box and re-encode as PNG.
///
/// Uploads are rejected here rather than at render time, so a stored embedded
/// image always decodes.
pub fn normalize_upload(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if bytes.is_empty() {
        return Err(Error::missing_field("image"));
    }
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| Error::invalid_value("image", format!("not a supported image: {e}")))?;
    let resized = decoded.resize_exact(width, height, FilterType::Triangle);
    encode_png(&resized.to_rgba8())
}
