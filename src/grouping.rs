use log::{debug, warn};
use logging_timer::time;

use crate::{bubbles::Bubble, sheet::GroupingStrategy};

/// The bubbles of one question, ordered left to right so that index 0 is
/// option `A`.
#[derive(Debug, Clone)]
pub struct Question {
    /// 1-based.
    pub number: usize,
    pub bubbles: Vec<Bubble>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupedBubbles {
    pub questions: Vec<Question>,
    /// Trailing bubbles that did not fill a complete question.
    pub discarded: Vec<Bubble>,
}

/// Partitions bubbles into questions of exactly `options_per_question`
/// bubbles each. With zero options per question every bubble is discarded.
#[time]
pub fn group_bubbles(
    bubbles: Vec<Bubble>,
    options_per_question: usize,
    strategy: &GroupingStrategy,
) -> GroupedBubbles {
    if options_per_question == 0 {
        warn!("cannot group {} bubble(s) into empty questions", bubbles.len());
        return GroupedBubbles {
            questions: vec![],
            discarded: bubbles,
        };
    }

    let grouped = match strategy {
        GroupingStrategy::GlobalSort => group_by_global_sort(bubbles, options_per_question),
        GroupingStrategy::RowBands { tolerance } => {
            group_by_row_bands(bubbles, options_per_question, *tolerance)
        }
    };

    if !grouped.discarded.is_empty() {
        warn!(
            "discarding {} bubble(s) that do not form a complete question of {} options",
            grouped.discarded.len(),
            options_per_question
        );
    }
    debug!("grouped bubbles into {} question(s)", grouped.questions.len());
    grouped
}

/// Sorts top-to-bottom, chunks into questions, then sorts each question
/// left-to-right. Both sorts are stable.
pub fn group_by_global_sort(mut bubbles: Vec<Bubble>, options_per_question: usize) -> GroupedBubbles {
    bubbles.sort_by_key(|bubble| bubble.bounds.top());

    let mut grouped = GroupedBubbles::default();
    push_row(&mut grouped, bubbles, options_per_question);
    grouped
}

/// Clusters bubbles into rows whose top edges lie within `tolerance` pixels
/// of the row's first bubble, then chunks each row left-to-right.
pub fn group_by_row_bands(
    mut bubbles: Vec<Bubble>,
    options_per_question: usize,
    tolerance: u32,
) -> GroupedBubbles {
    bubbles.sort_by_key(|bubble| bubble.bounds.top());

    let mut rows: Vec<Vec<Bubble>> = vec![];
    for bubble in bubbles {
        match rows.last_mut() {
            Some(row)
                if i64::from(bubble.bounds.top()) - i64::from(row[0].bounds.top())
                    <= i64::from(tolerance) =>
            {
                row.push(bubble)
            }
            _ => rows.push(vec![bubble]),
        }
    }

    let mut grouped = GroupedBubbles::default();
    for mut row in rows {
        row.sort_by_key(|bubble| bubble.bounds.left());
        push_row(&mut grouped, row, options_per_question);
    }
    grouped
}

/// Chunks the sequence into questions, sorting each chunk left-to-right, and
/// records any incomplete trailing chunk as discarded.
fn push_row(grouped: &mut GroupedBubbles, bubbles: Vec<Bubble>, options_per_question: usize) {
    if options_per_question == 0 {
        grouped.discarded.extend(bubbles);
        return;
    }

    let mut bubbles = bubbles.into_iter().peekable();
    while bubbles.peek().is_some() {
        let mut chunk = bubbles
            .by_ref()
            .take(options_per_question)
            .collect::<Vec<Bubble>>();
        if chunk.len() < options_per_question {
            grouped.discarded.append(&mut chunk);
            break;
        }

        chunk.sort_by_key(|bubble| bubble.bounds.left());
        grouped.questions.push(Question {
            number: grouped.questions.len() + 1,
            bubbles: chunk,
        });
    }
}

#[cfg(test)]
mod tests {
    use imageproc::rect::Rect;
    use proptest::prelude::*;

    use super::*;
    use crate::bubbles::tests::square_bubble;

    fn bubble_at(x: i32, y: i32) -> Bubble {
        square_bubble(Rect::at(x, y).of_size(20, 20))
    }

    fn positions(question: &Question) -> Vec<(i32, i32)> {
        question
            .bubbles
            .iter()
            .map(|b| (b.bounds.left(), b.bounds.top()))
            .collect()
    }

    #[test]
    fn test_global_sort_orders_rows_then_columns() {
        let bubbles = vec![
            bubble_at(150, 100),
            bubble_at(0, 0),
            bubble_at(100, 100),
            bubble_at(150, 0),
            bubble_at(50, 100),
            bubble_at(50, 0),
            bubble_at(0, 100),
            bubble_at(100, 0),
        ];
        let grouped = group_bubbles(bubbles, 4, &GroupingStrategy::GlobalSort);
        assert_eq!(grouped.questions.len(), 2);
        assert!(grouped.discarded.is_empty());
        assert_eq!(grouped.questions[0].number, 1);
        assert_eq!(grouped.questions[1].number, 2);
        assert_eq!(
            positions(&grouped.questions[0]),
            vec![(0, 0), (50, 0), (100, 0), (150, 0)]
        );
        assert_eq!(
            positions(&grouped.questions[1]),
            vec![(0, 100), (50, 100), (100, 100), (150, 100)]
        );
    }

    #[test]
    fn test_global_sort_tolerates_slightly_uneven_rows() {
        let bubbles = vec![
            bubble_at(100, 2),
            bubble_at(0, 1),
            bubble_at(150, 0),
            bubble_at(50, 3),
        ];
        let grouped = group_bubbles(bubbles, 4, &GroupingStrategy::GlobalSort);
        assert_eq!(
            positions(&grouped.questions[0]),
            vec![(0, 1), (50, 3), (100, 2), (150, 0)]
        );
    }

    #[test]
    fn test_equal_tops_keep_input_order_before_column_sort() {
        let bubbles = vec![
            bubble_at(30, 0),
            bubble_at(10, 0),
            bubble_at(20, 0),
            bubble_at(0, 0),
            bubble_at(40, 0),
        ];
        let grouped = group_by_global_sort(bubbles, 4);
        assert_eq!(
            positions(&grouped.questions[0]),
            vec![(0, 0), (10, 0), (20, 0), (30, 0)]
        );
        assert_eq!(grouped.discarded.len(), 1);
        assert_eq!(grouped.discarded[0].bounds.left(), 40);
    }

    #[test]
    fn test_trailing_bubbles_are_discarded() {
        let bubbles = (0..6).map(|i| bubble_at(i * 30, 0)).collect();
        let grouped = group_bubbles(bubbles, 4, &GroupingStrategy::GlobalSort);
        assert_eq!(grouped.questions.len(), 1);
        assert_eq!(grouped.discarded.len(), 2);
    }

    #[test]
    fn test_no_bubbles_yields_no_questions() {
        let grouped = group_bubbles(vec![], 4, &GroupingStrategy::GlobalSort);
        assert!(grouped.questions.is_empty());
        assert!(grouped.discarded.is_empty());
    }

    #[test]
    fn test_row_bands_recover_rows_with_a_missing_bubble() {
        // the first row lost its third bubble; a global sort would borrow one
        // from the second row
        let bubbles = vec![
            bubble_at(0, 0),
            bubble_at(50, 1),
            bubble_at(150, 0),
            bubble_at(0, 100),
            bubble_at(50, 102),
            bubble_at(100, 99),
            bubble_at(150, 101),
        ];
        let grouped = group_bubbles(
            bubbles,
            4,
            &GroupingStrategy::RowBands { tolerance: 10 },
        );
        assert_eq!(grouped.questions.len(), 1);
        assert_eq!(
            positions(&grouped.questions[0]),
            vec![(0, 100), (50, 102), (100, 99), (150, 101)]
        );
        assert_eq!(grouped.discarded.len(), 3);
    }

    #[test]
    fn test_row_bands_split_wide_rows_into_several_questions() {
        let bubbles = (0..8).map(|i| bubble_at(i * 30, i % 2)).collect();
        let grouped = group_by_row_bands(bubbles, 4, 5);
        assert_eq!(grouped.questions.len(), 2);
        assert_eq!(grouped.questions[0].bubbles[0].bounds.left(), 0);
        assert_eq!(grouped.questions[1].bubbles[0].bounds.left(), 120);
    }

    #[test]
    fn test_zero_options_discards_every_bubble() {
        let bubbles = (0..5).map(|i| bubble_at(i * 30, 0)).collect::<Vec<_>>();
        let grouped = group_bubbles(bubbles.clone(), 0, &GroupingStrategy::GlobalSort);
        assert!(grouped.questions.is_empty());
        assert_eq!(grouped.discarded, bubbles);

        let grouped = group_by_row_bands(bubbles.clone(), 0, 5);
        assert!(grouped.questions.is_empty());
        assert_eq!(grouped.discarded.len(), 5);

        let grouped = group_by_global_sort(bubbles, 0);
        assert!(grouped.questions.is_empty());
        assert_eq!(grouped.discarded.len(), 5);
    }

    #[test]
    fn test_row_bands_with_huge_tolerance_form_one_row() {
        let bubbles = vec![
            bubble_at(0, 0),
            bubble_at(50, 400),
            bubble_at(100, 900),
            bubble_at(150, 1500),
        ];
        let grouped = group_by_row_bands(bubbles, 4, u32::MAX);
        assert_eq!(grouped.questions.len(), 1);
        assert_eq!(
            positions(&grouped.questions[0]),
            vec![(0, 0), (50, 400), (100, 900), (150, 1500)]
        );
        assert!(grouped.discarded.is_empty());
    }

    fn grouped_positions(grouped: &GroupedBubbles) -> Vec<(i32, i32)> {
        let mut all = grouped
            .questions
            .iter()
            .flat_map(positions)
            .chain(
                grouped
                    .discarded
                    .iter()
                    .map(|b| (b.bounds.left(), b.bounds.top())),
            )
            .collect::<Vec<_>>();
        all.sort();
        all
    }

    proptest! {
        #[test]
        fn grouping_preserves_every_bubble_once(
            coords in prop::collection::vec((0i32..500, 0i32..500), 0..40),
            tolerance in 0u32..20,
        ) {
            let bubbles = coords.iter().map(|&(x, y)| bubble_at(x, y)).collect::<Vec<_>>();
            let mut expected = coords.clone();
            expected.sort();

            let grouped = group_bubbles(bubbles.clone(), 4, &GroupingStrategy::GlobalSort);
            prop_assert!(grouped.discarded.len() < 4);
            prop_assert_eq!(grouped.questions.len(), coords.len() / 4);
            prop_assert!(grouped.questions.iter().all(|q| q.bubbles.len() == 4));
            prop_assert_eq!(grouped_positions(&grouped), expected.clone());

            let grouped = group_bubbles(bubbles, 4, &GroupingStrategy::RowBands { tolerance });
            prop_assert!(grouped.questions.iter().all(|q| q.bubbles.len() == 4));
            prop_assert_eq!(grouped_positions(&grouped), expected);
        }
    }
}
