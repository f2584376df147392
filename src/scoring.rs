use image::GrayImage;
use imageproc::{drawing::draw_polygon_mut, point::Point, rect::Rect};
use logging_timer::time;
use serde::Serialize;

use crate::{
    bubbles::Bubble,
    geometry::polygon_relative_to,
    grouping::Question,
    image_utils::{count_masked_pixels, WHITE},
    types::{OptionLetter, StudentAnswer},
};

/// The ink measured inside a single bubble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredBubble {
    pub bounds: Rect,
    pub fill_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredQuestion {
    pub number: usize,
    pub bubbles: Vec<ScoredBubble>,
    pub answer: StudentAnswer,
}

impl ScoredQuestion {
    pub fn fill_counts(&self) -> Vec<u32> {
        self.bubbles.iter().map(|b| b.fill_count).collect()
    }
}

/// Serializable view of a scored question for reports and debugging.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFill {
    pub question_number: usize,
    pub fill_counts: Vec<u32>,
    pub answer: StudentAnswer,
}

impl From<&ScoredQuestion> for QuestionFill {
    fn from(question: &ScoredQuestion) -> Self {
        Self {
            question_number: question.number,
            fill_counts: question.fill_counts(),
            answer: question.answer,
        }
    }
}

/// Renders the filled contour of the bubble, boundary included, into a mask
/// covering the bubble's bounding box.
pub fn bubble_interior_mask(bubble: &Bubble) -> GrayImage {
    let bounds = bubble.bounds;
    let mut mask = GrayImage::new(bounds.width(), bounds.height());
    let polygon = polygon_relative_to(
        &bubble.points,
        Point::new(bounds.left(), bounds.top()),
    );

    if polygon.len() > 1 {
        draw_polygon_mut(&mut mask, &polygon, WHITE);
    } else if let Some(point) = polygon.first() {
        if point.x >= 0
            && point.y >= 0
            && (point.x as u32) < mask.width()
            && (point.y as u32) < mask.height()
        {
            mask.put_pixel(point.x as u32, point.y as u32, WHITE);
        }
    }

    mask
}

/// Counts the ink pixels inside the bubble's interior.
pub fn score_bubble(ink: &GrayImage, bubble: &Bubble) -> ScoredBubble {
    let mask = bubble_interior_mask(bubble);
    ScoredBubble {
        bounds: bubble.bounds,
        fill_count: count_masked_pixels(ink, &mask, (bubble.bounds.left(), bubble.bounds.top())),
    }
}

/// Picks the option with the strictly greatest fill count. On a tie the
/// earliest option wins; if nothing has any ink there is no answer.
pub fn select_answer(fill_counts: &[u32]) -> StudentAnswer {
    let mut max_fill_count = 0;
    let mut selected = None;
    for (index, &fill_count) in fill_counts.iter().enumerate() {
        if fill_count > max_fill_count {
            max_fill_count = fill_count;
            selected = Some(index);
        }
    }

    selected.and_then(OptionLetter::from_index).into()
}

pub fn score_question(ink: &GrayImage, question: &Question) -> ScoredQuestion {
    let bubbles = question
        .bubbles
        .iter()
        .map(|bubble| score_bubble(ink, bubble))
        .collect::<Vec<ScoredBubble>>();
    let answer = select_answer(
        &bubbles
            .iter()
            .map(|bubble| bubble.fill_count)
            .collect::<Vec<u32>>(),
    );

    ScoredQuestion {
        number: question.number,
        bubbles,
        answer,
    }
}

#[time]
pub fn score_questions(ink: &GrayImage, questions: &[Question]) -> Vec<ScoredQuestion> {
    questions
        .iter()
        .map(|question| score_question(ink, question))
        .collect()
}
