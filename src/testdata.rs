//! Fixtures shared across test modules.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// MRZ line pair from a specimen Irish passport.
pub(crate) const LINE1: &str = "P<IRLOSULLIVAN<<LAUREN<<<<<<<<<<<<<<<<<<<<<<";
pub(crate) const LINE2: &str = "XN50037786IRL8805049F2309154<<<<<<<<<<<<<<<8";

pub(crate) fn mrz_text() -> String {
    format!("{LINE1}\n{LINE2}\n")
}

/// A flat grey PNG of the given dimensions.
pub(crate) fn grey_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 200, 200]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
