//! Grades scanned multiple-choice answer sheets: finds the bubbles on the
//! sheet, groups them into questions, decides which option of each question
//! was marked, and compares the marks against an answer key.

pub mod bubbles;
pub mod debug;
pub mod geometry;
pub mod grading;
pub mod grouping;
pub mod image_utils;
pub mod interpret;
pub mod preprocess;
pub mod scoring;
pub mod sheet;
pub mod types;

pub use grading::{AnswerKey, AnswerKeyError, Report, Verdict};
pub use interpret::{grade_sheet, grade_sheet_image, GradeSheetError, GradedSheet, InterpretOptions};
pub use sheet::{load_grading_options, GradingOptions};
pub use types::{OptionLetter, StudentAnswer};
