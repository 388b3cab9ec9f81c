use crate::dom::{TextPosition, TextRange};
use crate::preprocess::ZERO_WIDTH_NON_JOINER;
use crate::span::TextCheckpoint;

/// Number of characters of `original` covering `visible_len` characters of
/// the search text. Non-joiners before each counted character are included,
/// trailing ones are not.
pub fn highlight_length(original: &str, visible_len: usize) -> usize {
    let mut length = 0;
    let mut visible = 0;

    for c in original.chars() {
        if visible == visible_len {
            break;
        }
        length += 1;
        if c != ZERO_WIDTH_NON_JOINER {
            visible += 1;
        }
    }

    length
}

/// Map `match_len` collected characters back onto the document.
///
/// Returns `None` when nothing was collected.
pub fn project<N: Copy>(
    match_len: usize,
    checkpoints: &[TextCheckpoint<N>],
    start_node: N,
    start_offset: usize,
) -> Option<TextRange<N>> {
    let start = TextPosition::new(start_node, start_offset);
    let mut remaining = start_offset + match_len;

    for checkpoint in checkpoints {
        if remaining <= checkpoint.offset {
            return Some(TextRange {
                start,
                end: TextPosition::new(checkpoint.node, remaining),
            });
        }
        remaining -= checkpoint.offset;
    }

    // Longer than what was collected; stop at the end of the run
    let last = checkpoints.last()?;
    Some(TextRange {
        start,
        end: TextPosition::new(last.node, last.offset),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint(node: u32, offset: usize) -> TextCheckpoint<u32> {
        TextCheckpoint { node, offset }
    }

    #[test]
    fn match_inside_first_node() {
        let range = project(2, &[checkpoint(1, 3)], 1, 0).unwrap();
        assert_eq!(range.start, TextPosition::new(1, 0));
        assert_eq!(range.end, TextPosition::new(1, 2));
    }

    #[test]
    fn match_crossing_into_later_node() {
        // "我是中" from offset 2, then "国", then "人，"
        let checkpoints = [checkpoint(1, 3), checkpoint(2, 1), checkpoint(3, 2)];

        let range = project(2, &checkpoints, 1, 2).unwrap();
        assert_eq!(range.end, TextPosition::new(2, 1));

        let range = project(3, &checkpoints, 1, 2).unwrap();
        assert_eq!(range.end, TextPosition::new(3, 1));
    }

    #[test]
    fn every_length_lands_inside_a_checkpoint() {
        let checkpoints = [checkpoint(1, 5), checkpoint(2, 0), checkpoint(3, 4)];
        let collected = (5 - 3) + 0 + 4;

        for len in 0..=collected {
            let range = project(len, &checkpoints, 1, 3).unwrap();
            let owner = checkpoints
                .iter()
                .find(|c| c.node == range.end.node)
                .unwrap();
            assert!(range.end.offset <= owner.offset);
        }
    }

    #[test]
    fn empty_checkpoints_project_nothing() {
        assert_eq!(project::<u32>(2, &[], 1, 0), None);
    }

    #[test]
    fn non_joiner_counts_in_buffer_but_not_in_match() {
        assert_eq!(highlight_length("中\u{200c}国人", 2), 3);
        assert_eq!(highlight_length("\u{200c}中国", 2), 3);
        assert_eq!(highlight_length("中国\u{200c}人", 2), 2);
        assert_eq!(highlight_length("中国人", 2), 2);
    }
}
