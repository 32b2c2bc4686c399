//! MRZ band preparation for the precision OCR pass.
//!
//! The machine-readable zone sits in the bottom fifth of a TD-3 passport
//! page. Cropping to that band removes the portrait and background
//! ornamentation that compete for the recognizer's attention; contrast
//! stretching, upscaling and sharpening counter the small, dense OCR-B
//! glyphs.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat};
use thiserror::Error;

/// The MRZ band is the bottom `1 / MRZ_BAND_DIVISOR` of the page.
const MRZ_BAND_DIVISOR: u32 = 5;
const UPSCALE_FACTOR: u32 = 2;

/// 3x3 sharpening kernel: centre 2.0, neighbours -0.125, sum 1.0 so
/// overall brightness is preserved.
const SHARPEN_KERNEL: [f32; 9] = [
    -0.125, -0.125, -0.125,
    -0.125, 2.0, -0.125,
    -0.125, -0.125, -0.125,
];

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image too short for an MRZ band ({height} px tall)")]
    BandTooSmall { height: u32 },
    #[error("failed to encode MRZ band: {0}")]
    Encode(image::ImageError),
}

/// Crop and enhance the MRZ band, returning it as a losslessly encoded
/// PNG. A `W x H` input always yields a `2W x 2*(H/5)` output.
pub fn prepare_mrz_band(image_bytes: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let decoded = image::load_from_memory(image_bytes)?;
    let gray = decoded.to_luma8();
    let (width, height) = gray.dimensions();

    let band_height = height / MRZ_BAND_DIVISOR;
    if band_height == 0 {
        return Err(PreprocessError::BandTooSmall { height });
    }

    let band = imageops::crop_imm(&gray, 0, height - band_height, width, band_height).to_image();
    let band = stretch_contrast(&band);
    let band = imageops::resize(
        &band,
        width * UPSCALE_FACTOR,
        band_height * UPSCALE_FACTOR,
        FilterType::Lanczos3,
    );
    let band = imageops::filter3x3(&band, &SHARPEN_KERNEL);

    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(band)
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(PreprocessError::Encode)?;
    Ok(buffer.into_inner())
}

/// Linear contrast stretch: the darkest pixel maps to 0, the brightest to
/// 255. Uniform images pass through unchanged.
fn stretch_contrast(image: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in image.pixels() {
        min = min.min(pixel[0]);
        max = max.max(pixel[0]);
    }
    if max <= min {
        return image.clone();
    }

    let scale = 255.0 / f32::from(max - min);
    let mut stretched = image.clone();
    for pixel in stretched.pixels_mut() {
        pixel[0] = (f32::from(pixel[0] - min) * scale).round() as u8;
    }
    stretched
}
