//! Highlighting through the page selection without trampling user selections.

use crate::dom::{Selection, TextDocument, TextRange};

/// Select `range`, unless the user has a selection of their own.
///
/// `owned` holds the text of the last selection made here. Returns whether
/// the highlight was applied.
pub fn apply_highlight<D, S>(
    doc: &D,
    selection: &mut S,
    range: TextRange<D::Node>,
    owned: &mut Option<String>,
) -> bool
where
    D: TextDocument + ?Sized,
    S: Selection<D> + ?Sized,
{
    if !selection.is_collapsed() && owned.as_deref() != Some(selection.text(doc).as_str()) {
        tracing::debug!("Leaving user selection in place");
        return false;
    }

    selection.clear();
    selection.select(doc, range);
    *owned = Some(selection.text(doc));
    true
}

/// Drop the highlight made by [`apply_highlight`], if it is still ours
pub fn clear_highlight<D, S>(doc: &D, selection: &mut S, owned: &mut Option<String>)
where
    D: TextDocument + ?Sized,
    S: Selection<D> + ?Sized,
{
    let Some(text) = owned.take() else {
        return;
    };

    if selection.is_collapsed() || selection.text(doc) == text {
        selection.clear();
    }
}
