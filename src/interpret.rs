use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage};
use log::{debug, info, warn};
use logging_timer::time;

use crate::{
    bubbles::{filter_bubbles, find_external_contours, Bubble},
    debug::{
        draw_contour_rects_debug_image_mut, draw_scored_questions_debug_image_mut,
        ImageDebugWriter,
    },
    grading::{grade_answers, AnswerKey, DetectionSummary, Report},
    grouping::group_bubbles,
    preprocess::preprocess_sheet,
    scoring::{score_questions, ScoredQuestion},
    sheet::{ConfigError, GradingOptions},
    types::StudentAnswer,
};

#[derive(Debug, Clone, Default)]
pub struct InterpretOptions {
    pub debug: bool,
    pub grading: GradingOptions,
}

#[derive(thiserror::Error, Debug)]
pub enum GradeSheetError {
    #[error("unable to open sheet image {0}: {1}")]
    ImageOpen(PathBuf, #[source] image::ImageError),
    #[error("unable to decode sheet image: {0}")]
    ImageDecode(#[source] image::ImageError),
    #[error(transparent)]
    InvalidOptions(#[from] ConfigError),
}

/// The report for one sheet along with the per-bubble measurements that led
/// to it.
#[derive(Debug, Clone)]
pub struct GradedSheet {
    pub report: Report,
    pub scored_questions: Vec<ScoredQuestion>,
}

#[time]
pub fn load_sheet_image(image_path: &Path) -> Result<GrayImage, GradeSheetError> {
    match image::open(image_path) {
        Ok(img) => Ok(img.into_luma8()),
        Err(e) => Err(GradeSheetError::ImageOpen(image_path.to_path_buf(), e)),
    }
}

/// Decodes an in-memory PNG or JPEG sheet.
pub fn decode_sheet_image(bytes: &[u8]) -> Result<GrayImage, GradeSheetError> {
    image::load_from_memory(bytes)
        .map(DynamicImage::into_luma8)
        .map_err(GradeSheetError::ImageDecode)
}

/// Scores and grades bubbles that have already been detected, measuring
/// their fill against the binarized `ink` buffer.
pub fn grade_detected_bubbles(
    bubbles: Vec<Bubble>,
    ink: &GrayImage,
    key: &AnswerKey,
    options: &GradingOptions,
) -> GradedSheet {
    let bubbles_detected = bubbles.len();
    if bubbles_detected == 0 {
        warn!("no bubbles detected on sheet");
    }

    let grouped = group_bubbles(bubbles, options.options_per_question, &options.grouping);
    let scored_questions = score_questions(ink, &grouped.questions);
    let answers = scored_questions
        .iter()
        .map(|question| question.answer)
        .collect::<Vec<StudentAnswer>>();

    let detection = DetectionSummary {
        bubbles_detected,
        questions_detected: grouped.questions.len(),
        discarded_bubbles: grouped.discarded.len(),
    };

    GradedSheet {
        report: grade_answers(&answers, key, detection),
        scored_questions,
    }
}

/// Runs the whole pipeline over a decoded sheet.
#[time]
pub fn grade_sheet_image(
    img: &GrayImage,
    key: &AnswerKey,
    options: &GradingOptions,
    debug: &ImageDebugWriter,
) -> GradedSheet {
    let preprocessed = preprocess_sheet(img, options);
    debug.write_gray("edges", &preprocessed.edges);
    debug.write_gray("ink", &preprocessed.ink);

    let contours = find_external_contours(&preprocessed.edges);
    debug.write("contours", |canvas| {
        draw_contour_rects_debug_image_mut(canvas, &contours)
    });

    let bubbles = filter_bubbles(contours, &options.bubble);
    let graded = grade_detected_bubbles(bubbles, &preprocessed.ink, key, options);
    debug.write("scored", |canvas| {
        draw_scored_questions_debug_image_mut(canvas, &graded.scored_questions)
    });

    info!(
        "graded {} question(s): {} correct",
        graded.report.total_evaluated, graded.report.total_correct
    );
    graded
}

/// Loads the sheet at `image_path` and grades it against `key`.
#[time]
pub fn grade_sheet(
    image_path: &Path,
    key: &AnswerKey,
    options: &InterpretOptions,
) -> Result<GradedSheet, GradeSheetError> {
    options.grading.validate()?;
    let img = load_sheet_image(image_path)?;
    debug!(
        "loaded {} ({}x{})",
        image_path.display(),
        img.width(),
        img.height()
    );

    let debug = if options.debug {
        ImageDebugWriter::new(image_path.to_path_buf(), img.clone())
    } else {
        ImageDebugWriter::disabled()
    };

    Ok(grade_sheet_image(&img, key, &options.grading, &debug))
}
