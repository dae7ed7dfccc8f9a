//! Unwrapping of inline-level elements.

use crate::model::{NodeId, Tree};

use super::TextOptions;

/// Remove every inline element, splicing its children into its parent.
///
/// Nested inline elements are all removed; the text of the tree is
/// unchanged. Returns the number of elements unwrapped.
pub fn flatten_inlines(tree: &mut Tree, options: &TextOptions) -> usize {
    // Unwrapping moves children up but never detaches them, so one
    // snapshot in document order covers nested inlines too.
    let inlines: Vec<NodeId> = tree
        .elements()
        .filter(|&id| {
            tree.tag(id)
                .is_some_and(|tag| options.inline_tags.contains(tag))
        })
        .collect();

    let unwrapped = inlines.into_iter().filter(|&id| tree.unwrap(id)).count();
    log::debug!("Unwrapped {} inline elements", unwrapped);
    unwrapped
}
