use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::{
    contours::Contour,
    drawing::{draw_cross_mut, draw_filled_rect_mut, draw_hollow_rect_mut},
    rect::Rect,
};
use log::{debug, warn};

use crate::{
    geometry::{center_of_rect, get_contour_bounding_rect},
    image_utils::{BLUE, DARK_GREEN, GREEN, PINK, RAINBOW, RED},
    scoring::ScoredQuestion,
    types::StudentAnswer,
};

/// Creates a path for a debug image.
pub fn debug_image_path(base: &Path, label: &str) -> PathBuf {
    let mut result = PathBuf::from(base);
    result.set_file_name(format!(
        "{}_debug_{}.png",
        base.file_stem().unwrap_or_default().to_string_lossy(),
        label
    ));
    result
}

/// Writes debug images derived from a sheet next to the sheet's own file.
/// A disabled writer does nothing.
#[derive(Debug, Clone)]
pub struct ImageDebugWriter {
    input_path: PathBuf,
    input_image: Option<GrayImage>,
}

impl ImageDebugWriter {
    pub fn new(input_path: PathBuf, input_image: GrayImage) -> Self {
        Self {
            input_path,
            input_image: Some(input_image),
        }
    }

    pub fn disabled() -> Self {
        Self {
            input_path: PathBuf::new(),
            input_image: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.input_image.is_some()
    }

    /// Draws on a color copy of the input image and saves it under `label`,
    /// returning the path written.
    pub fn write(&self, label: &str, draw: impl FnOnce(&mut RgbImage)) -> Option<PathBuf> {
        let input_image = self.input_image.as_ref()?;
        let mut canvas = DynamicImage::ImageLuma8(input_image.clone()).into_rgb8();
        draw(&mut canvas);
        self.save(label, &canvas)
    }

    /// Saves a grayscale buffer, such as an edge map, as-is under `label`.
    pub fn write_gray(&self, label: &str, img: &GrayImage) -> Option<PathBuf> {
        if !self.is_enabled() {
            return None;
        }
        self.save(label, &DynamicImage::ImageLuma8(img.clone()).into_rgb8())
    }

    fn save(&self, label: &str, canvas: &RgbImage) -> Option<PathBuf> {
        let path = debug_image_path(&self.input_path, label);
        match canvas.save(&path) {
            Ok(()) => {
                debug!("wrote debug image {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("unable to write debug image {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Draws the bounding rects of every external contour, including the ones
/// rejected as bubbles.
pub fn draw_contour_rects_debug_image_mut(canvas: &mut RgbImage, contours: &[Contour<i32>]) {
    for (i, rect) in contours
        .iter()
        .filter_map(get_contour_bounding_rect)
        .enumerate()
    {
        draw_filled_rect_mut(canvas, rect, RAINBOW[i % RAINBOW.len()]);
    }
}

/// Outlines the scored bubbles: the selected option green, the others blue,
/// and every bubble of an unanswered question red.
pub fn draw_scored_questions_debug_image_mut(
    canvas: &mut RgbImage,
    scored_questions: &[ScoredQuestion],
) {
    for question in scored_questions {
        let selected = question.answer.letter().map(|letter| letter.index());
        for (index, bubble) in question.bubbles.iter().enumerate() {
            let color = match question.answer {
                StudentAnswer::NoAnswer => RED,
                _ if Some(index) == selected => GREEN,
                _ => BLUE,
            };
            draw_hollow_rect_mut(canvas, bubble.bounds, color);
            if Some(index) == selected {
                draw_hollow_rect_mut(canvas, grow_rect(&bubble.bounds, 2), DARK_GREEN);
            }

            let center = center_of_rect(&bubble.bounds);
            draw_cross_mut(
                canvas,
                PINK,
                center.x.round() as i32,
                center.y.round() as i32,
            );
        }
    }
}

fn grow_rect(rect: &Rect, by: u32) -> Rect {
    Rect::at(rect.left() - by as i32, rect.top() - by as i32)
        .of_size(rect.width() + 2 * by, rect.height() + 2 * by)
}
