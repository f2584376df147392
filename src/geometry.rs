use imageproc::contours::Contour;
use imageproc::point::Point;
use imageproc::rect::Rect;

/// Gets the smallest rect containing every point of the contour, inclusive
/// of the boundary pixels. Empty contours have no bounds.
pub fn get_contour_bounding_rect(contour: &Contour<i32>) -> Option<Rect> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for point in &contour.points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Some(Rect::at(min_x, min_y).of_size((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32))
}

/// Width over height.
pub fn aspect_ratio(rect: &Rect) -> f32 {
    rect.width() as f32 / rect.height() as f32
}

pub fn center_of_rect(rect: &Rect) -> Point<f32> {
    Point::new(
        rect.left() as f32 + rect.width() as f32 / 2.0,
        rect.top() as f32 + rect.height() as f32 / 2.0,
    )
}

/// Moves the contour points so that `origin` becomes `(0, 0)`, dropping
/// consecutive duplicates and a closing point equal to the first.
pub fn polygon_relative_to(points: &[Point<i32>], origin: Point<i32>) -> Vec<Point<i32>> {
    let mut polygon: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for point in points {
        let shifted = Point::new(point.x - origin.x, point.y - origin.y);
        if polygon.last() != Some(&shifted) {
            polygon.push(shifted);
        }
    }

    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }

    polygon
}
