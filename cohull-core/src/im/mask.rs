// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma, open as open_dynamic};

use crate::constant;
use crate::error::CohullError;
use crate::im::PixelGrid;

/// Open a binary mask from a provided path
///
/// Any non-zero pixel is foreground and is stored with a value of 1.
///
/// # Arguments
///
/// * `path` - A path to an image with a valid extension
///
/// ```no_run
/// use cohull_core::im::open_mask;
/// let grid = open_mask("mask.png");
/// ```
pub fn open_mask<P: AsRef<Path>>(path: P) -> Result<PixelGrid, CohullError> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    if let Some(ext) = extension {
        if constant::SUPPORTED_IMAGE_FORMATS.iter().any(|e| e == &ext) {
            if let Ok(image) = open_dynamic(&path) {
                return mask_from_dynamic(image);
            }

            return Err(CohullError::ImageReadError);
        }
    }

    Err(CohullError::ImageExtensionError)
}

/// Initialize a binary mask grid from a DynamicImage
///
/// Grayscale images are read directly and alpha is ignored. A colour pixel
/// is foreground when any of its colour channels is non-zero.
///
/// # Examples
///
/// ```
/// use image::{DynamicImage, GrayImage, Luma};
/// use cohull_core::im::mask_from_dynamic;
///
/// let mut gray = GrayImage::new(3, 2);
/// gray.put_pixel(1, 0, Luma([200]));
///
/// let grid = mask_from_dynamic(DynamicImage::ImageLuma8(gray)).unwrap();
/// assert_eq!(grid.values(), [0, 1, 0, 0, 0, 0]);
/// ```
pub fn mask_from_dynamic(mask: DynamicImage) -> Result<PixelGrid, CohullError> {
    let width = mask.width() as usize;
    let height = mask.height() as usize;

    let data: Vec<i32> = match mask {
        DynamicImage::ImageLuma8(buffer) => buffer
            .into_raw()
            .into_iter()
            .map(|pixel| (pixel != 0) as i32)
            .collect(),
        DynamicImage::ImageLumaA8(buffer) => buffer
            .into_raw()
            .chunks_exact(2)
            .map(|pixel| (pixel[0] != 0) as i32)
            .collect(),
        DynamicImage::ImageLuma16(buffer) => buffer
            .into_raw()
            .into_iter()
            .map(|pixel| (pixel != 0) as i32)
            .collect(),
        DynamicImage::ImageLumaA16(buffer) => buffer
            .into_raw()
            .chunks_exact(2)
            .map(|pixel| (pixel[0] != 0) as i32)
            .collect(),
        other => other
            .into_rgb32f()
            .into_raw()
            .chunks_exact(3)
            .map(|pixel| pixel.iter().any(|&channel| channel != 0.0) as i32)
            .collect(),
    };

    PixelGrid::new(data, width, height)
}

/// Write the labels of a labeled grid as a 16-bit grayscale image
///
/// # Arguments
///
/// * `grid` - A grid after connected component labeling
/// * `path` - Output path with an image extension (e.g. png)
pub fn save_label_map<P: AsRef<Path>>(grid: &PixelGrid, path: P) -> Result<(), CohullError> {
    if grid.registry().component_count() > u16::MAX as usize {
        return Err(CohullError::LabelOverflowError);
    }

    let labels: Vec<u16> = grid
        .points()
        .iter()
        .map(|p| p.value.clamp(0, u16::MAX as i32) as u16)
        .collect();

    let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(grid.width() as u32, grid.height() as u32, labels)
            .ok_or(CohullError::ImageWriteError)?;

    buffer
        .save(path)
        .map_err(|_| CohullError::ImageWriteError)
}
