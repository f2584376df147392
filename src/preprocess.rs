use image::{imageops::invert, GrayImage};
use imageproc::{
    contrast::{otsu_level, threshold},
    edges::canny,
    filter::gaussian_blur_f32,
};
use log::debug;
use logging_timer::time;

use crate::{
    image_utils::{count_pixels, WHITE},
    sheet::GradingOptions,
};

/// The derived buffers every later stage works from.
#[derive(Debug, Clone)]
pub struct PreprocessedSheet {
    pub blurred: GrayImage,
    /// Edge map, 255 on edges.
    pub edges: GrayImage,
    /// Binarized sheet, 255 where there is ink.
    pub ink: GrayImage,
    pub ink_threshold: u8,
}

/// Smooths the sheet, finds its edges, and binarizes it so that dark marks
/// become foreground.
#[time]
pub fn preprocess_sheet(img: &GrayImage, options: &GradingOptions) -> PreprocessedSheet {
    let blurred = gaussian_blur_f32(img, options.blur_sigma);
    let edges = canny(
        &blurred,
        options.canny_low_threshold,
        options.canny_high_threshold,
    );
    let (ink, ink_threshold) = binarize_ink(&blurred);
    debug!(
        "preprocessed {}x{} sheet, ink threshold {} ({} ink pixels)",
        img.width(),
        img.height(),
        ink_threshold,
        count_pixels(&ink, &WHITE)
    );

    PreprocessedSheet {
        blurred,
        edges,
        ink,
        ink_threshold,
    }
}

/// Inverse binarization at the Otsu level: pixels at or below the level
/// become 255, everything brighter becomes 0.
pub fn binarize_ink(img: &GrayImage) -> (GrayImage, u8) {
    let level = otsu_level(img);
    let mut ink = threshold(img, level);
    invert(&mut ink);
    (ink, level)
}
