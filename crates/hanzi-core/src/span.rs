use crate::dom::{TextDocument, TextPosition};

/// Where a collected run stopped inside one text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCheckpoint<N> {
    pub node: N,
    /// Offset within `node` up to which characters were taken
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<N> {
    pub buffer: String,
    pub checkpoints: Vec<TextCheckpoint<N>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    #[error("Start node is not a text node")]
    NotText,

    /// Only reachable by callers that skip [`advance_to_text`], which never
    /// yields an offset at or past the end of a node.
    #[error("Offset {offset} out of range for text of length {len}")]
    OffsetOutOfRange { offset: usize, len: usize },
}

/// Collect up to `max_length` characters starting at `offset` in `start`,
/// continuing through following text nodes in document order.
pub fn collect<D>(
    doc: &D,
    start: D::Node,
    offset: usize,
    max_length: usize,
) -> Result<Span<D::Node>, SpanError>
where
    D: TextDocument + ?Sized,
{
    let text = doc.text(start).ok_or(SpanError::NotText)?;
    let len = text.chars().count();
    if offset >= len {
        return Err(SpanError::OffsetOutOfRange { offset, len });
    }

    let end = len.min(offset.saturating_add(max_length));
    let mut buffer: String = text.chars().skip(offset).take(end - offset).collect();
    let mut collected = end - offset;
    let mut checkpoints = vec![TextCheckpoint {
        node: start,
        offset: end,
    }];

    let mut cursor = start;
    while collected < max_length {
        let Some(next) = doc.next_text_node(cursor) else {
            break;
        };
        let Some(text) = doc.text(next) else {
            break;
        };

        let take = text.chars().count().min(max_length - collected);
        buffer.extend(text.chars().take(take));
        collected += take;
        checkpoints.push(TextCheckpoint {
            node: next,
            offset: take,
        });
        cursor = next;
    }

    Ok(Span {
        buffer,
        checkpoints,
    })
}

/// Move a caret sitting at the very end of a text node onto the start of the
/// next non-empty text node.
pub fn advance_to_text<D>(doc: &D, node: D::Node, offset: usize) -> Option<TextPosition<D::Node>>
where
    D: TextDocument + ?Sized,
{
    let mut position = TextPosition::new(node, offset);
    while position.offset >= doc.text_len(position.node)? {
        position = TextPosition::new(doc.next_text_node(position.node)?, 0);
    }
    Some(position)
}
