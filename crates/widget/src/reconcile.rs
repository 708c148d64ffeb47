//! Merging checklist selections into the list that gets saved.

use std::collections::HashSet;

use saved_cart_core::CartLine;

/// Build the list of lines to save.
///
/// Selected live lines come first in live-cart order, followed by selected
/// saved lines in saved-cart order. Each selected ID picks the first line
/// carrying it in its list, so a list holding the same ID twice contributes
/// one copy. The same ID selected in both lists is kept twice. Lines are
/// copied whole, so fields the widget does not read survive the round trip.
/// Selected IDs that no longer match a line contribute nothing.
#[must_use]
pub fn merge_selection(
    live: &[CartLine],
    selected_live: &HashSet<String>,
    saved: &[CartLine],
    selected_saved: &HashSet<String>,
) -> Vec<CartLine> {
    let mut merged = pick_first(live, selected_live);
    merged.extend(pick_first(saved, selected_saved));
    merged
}

/// First line per selected ID, in list order.
fn pick_first(lines: &[CartLine], selected: &HashSet<String>) -> Vec<CartLine> {
    let mut seen = HashSet::with_capacity(selected.len());
    lines
        .iter()
        .filter(|&line| selected.contains(&line.id) && seen.insert(line.id.as_str()))
        .cloned()
        .collect()
}
