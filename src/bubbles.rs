use image::GrayImage;
use imageproc::{
    contours::{find_contours, BorderType, Contour},
    point::Point,
    rect::Rect,
};
use log::debug;
use logging_timer::time;

use crate::{
    geometry::{aspect_ratio, get_contour_bounding_rect},
    sheet::BubbleGeometry,
};

/// The boundary of a contour that passed geometric filtering as a plausible
/// answer bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub points: Vec<Point<i32>>,
    pub bounds: Rect,
}

impl Bubble {
    pub fn new(points: Vec<Point<i32>>, bounds: Rect) -> Self {
        Self { points, bounds }
    }
}

/// Finds the outermost contours of the edge map: outer borders that are not
/// nested inside any other border.
#[time]
pub fn find_external_contours(edges: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .collect()
}

/// Keeps the contours whose bounding boxes could be bubbles, in input order.
#[time]
pub fn filter_bubbles(contours: Vec<Contour<i32>>, geometry: &BubbleGeometry) -> Vec<Bubble> {
    let candidate_count = contours.len();
    let bubbles = contours
        .into_iter()
        .filter_map(|contour| {
            let bounds = get_contour_bounding_rect(&contour)?;
            if rect_could_be_bubble(geometry, &bounds) {
                Some(Bubble::new(contour.points, bounds))
            } else {
                None
            }
        })
        .collect::<Vec<Bubble>>();

    debug!(
        "accepted {} of {} contours as bubbles",
        bubbles.len(),
        candidate_count
    );
    bubbles
}

/// Finds every bubble in the edge map.
pub fn find_bubbles(edges: &GrayImage, geometry: &BubbleGeometry) -> Vec<Bubble> {
    filter_bubbles(find_external_contours(edges), geometry)
}

/// Determines whether a rect could be a bubble based on its size and shape.
pub fn rect_could_be_bubble(geometry: &BubbleGeometry, rect: &Rect) -> bool {
    let aspect_ratio = aspect_ratio(rect);
    aspect_ratio >= geometry.min_aspect_ratio
        && aspect_ratio <= geometry.max_aspect_ratio
        && rect.width() >= geometry.min_size
        && rect.width() <= geometry.max_size
        && rect.height() >= geometry.min_size
        && rect.height() <= geometry.max_size
}
