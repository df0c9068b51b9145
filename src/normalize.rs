//! Upload normalization: EXIF orientation, square crop, fixed-size resize.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};

use crate::error::{PipelineError, Result};

/// Side length of the square canvas both inference services expect.
pub const CANVAS_SIZE: u32 = 512;

/// A 512x512 image ready to send upstream.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub image: DynamicImage,
    pub png: Vec<u8>,
    pub base64: String,
}

/// Reads EXIF tag 0x0112 from the raw upload.
///
/// Missing or unreadable metadata is not an error; the image is used as-is.
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let meta = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::debug!("no rotation to perform based on EXIF data: {e}");
            return None;
        }
    };

    meta.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
}

/// Undoes the rotation/mirroring recorded by the camera.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Center crop to the largest square that fits.
pub fn crop_max_square(img: &DynamicImage) -> DynamicImage {
    let (w, h) = img.dimensions();
    let side = w.min(h);
    img.crop_imm((w - side) / 2, (h - side) / 2, side, side)
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    Ok(png)
}

/// Decodes an upload and brings it to the canvas the services expect.
pub fn normalize(bytes: &[u8]) -> Result<NormalizedImage> {
    let img = image::load_from_memory(bytes).map_err(PipelineError::InvalidUpload)?;
    let (orig_w, orig_h) = img.dimensions();

    let img = match read_orientation(bytes) {
        Some(orientation) => apply_orientation(img, orientation),
        None => img,
    };

    let resized = crop_max_square(&img).resize_exact(CANVAS_SIZE, CANVAS_SIZE, FilterType::CatmullRom);
    let png = encode_png(&resized)?;
    let base64 = general_purpose::STANDARD.encode(&png);

    tracing::debug!(
        orig_w,
        orig_h,
        png_bytes = png.len(),
        "normalized upload to {CANVAS_SIZE}x{CANVAS_SIZE}"
    );

    Ok(NormalizedImage {
        image: resized,
        png,
        base64,
    })
}
