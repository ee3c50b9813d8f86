//! Convenience helpers for the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use std::path::Path;

use crate::field::OffsetField;
use crate::image::OwnedImage;
use crate::pixel::{Gray8, Rgb8};
use crate::util::{PatchFieldError, PatchFieldResult};

/// Creates an owned grayscale image from a `image::GrayImage` buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> PatchFieldResult<OwnedImage<Gray8>> {
    let data = img.as_raw().iter().map(|&v| Gray8(v)).collect();
    OwnedImage::new(data, img.width() as usize, img.height() as usize)
}

/// Creates an owned RGB image from a `image::RgbImage` buffer.
pub fn owned_from_rgb_image(img: &image::RgbImage) -> PatchFieldResult<OwnedImage<Rgb8>> {
    let data = img
        .pixels()
        .map(|p| Rgb8::new(p.0[0], p.0[1], p.0[2]))
        .collect();
    OwnedImage::new(data, img.width() as usize, img.height() as usize)
}

/// Creates an owned single-channel mask from a `image::GrayImage` buffer.
pub fn mask_from_gray_image(img: &image::GrayImage) -> PatchFieldResult<OwnedImage<u8>> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Loads an image from disk as grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> PatchFieldResult<OwnedImage<Gray8>> {
    let img = image::open(path).map_err(|err| PatchFieldError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}

/// Loads an image from disk as RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> PatchFieldResult<OwnedImage<Rgb8>> {
    let img = image::open(path).map_err(|err| PatchFieldError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_rgb_image(&img.to_rgb8())
}

/// Writes an offset field as a two-channel gray+alpha image, each
/// component biased by +128 and saturated to 8 bits.
pub fn save_offset_field<P: AsRef<Path>>(field: &OffsetField, path: P) -> PatchFieldResult<()> {
    let encode = |v: i16| (i32::from(v) + 128).clamp(0, 255) as u8;
    let img = image::GrayAlphaImage::from_fn(
        field.width() as u32,
        field.height() as u32,
        |x, y| {
            let offset = field
                .get(x as usize, y as usize)
                .expect("field cell within image bounds");
            image::LumaA([encode(offset.dx), encode(offset.dy)])
        },
    );
    img.save(path).map_err(|err| PatchFieldError::ImageIo {
        reason: err.to_string(),
    })
}
