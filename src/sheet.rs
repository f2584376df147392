use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::MAX_OPTIONS_PER_QUESTION;

/// Pixel-scale bounds a contour's bounding box must satisfy to be a bubble.
/// The defaults are tuned to the scan resolution of a typical answer sheet.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BubbleGeometry {
    pub min_size: u32,
    pub max_size: u32,
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
}

impl Default for BubbleGeometry {
    fn default() -> Self {
        Self {
            min_size: 15,
            max_size: 50,
            min_aspect_ratio: 0.8,
            max_aspect_ratio: 1.2,
        }
    }
}

/// How accepted bubbles are partitioned into questions.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum GroupingStrategy {
    /// Sort every bubble top-to-bottom and chunk the result into questions.
    #[serde(rename = "globalSort")]
    GlobalSort,

    /// Cluster bubbles into rows by top edge before chunking each row.
    #[serde(rename = "rowBands")]
    RowBands { tolerance: u32 },
}

impl Default for GroupingStrategy {
    fn default() -> Self {
        GroupingStrategy::GlobalSort
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradingOptions {
    pub bubble: BubbleGeometry,
    pub options_per_question: usize,
    pub max_key_length: usize,
    pub blur_sigma: f32,
    pub canny_low_threshold: f32,
    pub canny_high_threshold: f32,
    pub grouping: GroupingStrategy,
}

impl Default for GradingOptions {
    fn default() -> Self {
        Self {
            bubble: BubbleGeometry::default(),
            options_per_question: 4,
            max_key_length: 30,
            // equivalent to a 5x5 kernel
            blur_sigma: 1.1,
            canny_low_threshold: 75.0,
            canny_high_threshold: 200.0,
            grouping: GroupingStrategy::GlobalSort,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unable to read options file {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("unable to parse options file {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),
    #[error("invalid grading options: {0}")]
    Invalid(String),
}

impl GradingOptions {
    /// Checks the options for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bubble = &self.bubble;
        if bubble.min_size == 0 || bubble.min_size > bubble.max_size {
            return Err(ConfigError::Invalid(format!(
                "bubble size bounds must satisfy 0 < min ({}) <= max ({})",
                bubble.min_size, bubble.max_size
            )));
        }
        if !(bubble.min_aspect_ratio > 0.0 && bubble.min_aspect_ratio <= bubble.max_aspect_ratio) {
            return Err(ConfigError::Invalid(format!(
                "aspect ratio bounds must satisfy 0 < min ({}) <= max ({})",
                bubble.min_aspect_ratio, bubble.max_aspect_ratio
            )));
        }
        if !(2..=MAX_OPTIONS_PER_QUESTION).contains(&self.options_per_question) {
            return Err(ConfigError::Invalid(format!(
                "options per question must be between 2 and {}, got {}",
                MAX_OPTIONS_PER_QUESTION, self.options_per_question
            )));
        }
        if self.max_key_length == 0 {
            return Err(ConfigError::Invalid(
                "max key length must be positive".to_string(),
            ));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "blur sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if !(self.canny_low_threshold >= 0.0
            && self.canny_low_threshold <= self.canny_high_threshold)
        {
            return Err(ConfigError::Invalid(format!(
                "canny thresholds must satisfy 0 <= low ({}) <= high ({})",
                self.canny_low_threshold, self.canny_high_threshold
            )));
        }
        Ok(())
    }
}

/// Reads and validates grading options from a JSON file. Missing fields take
/// their default values.
pub fn load_grading_options(path: &Path) -> Result<GradingOptions, ConfigError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let options: GradingOptions =
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
    options.validate()?;
    Ok(options)
}
