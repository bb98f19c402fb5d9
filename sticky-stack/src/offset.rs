use crate::{HeaderEntry, HeaderId, StackError};

/// Computes the offset at which `self_id` is pinned: the sum of the heights of every entry
/// registered before it.
///
/// `height_of` must return each entry's currently rendered height. Entries after `self_id` are
/// never consulted.
///
/// Returns [`StackError::NotRegistered`] if `self_id` is not in `snapshot`; callers that cannot
/// handle the error should treat the offset as 0.
pub fn compute_stacked_top<H>(
    snapshot: &[HeaderEntry<H>],
    self_id: HeaderId,
    mut height_of: impl FnMut(&HeaderEntry<H>) -> u32,
) -> Result<u64, StackError> {
    let index = snapshot
        .iter()
        .position(|e| e.id == self_id)
        .ok_or(StackError::NotRegistered(self_id))?;
    Ok(snapshot[..index]
        .iter()
        .fold(0u64, |top, e| top.saturating_add(height_of(e) as u64)))
}

/// Single prefix pass over `heights`, calling `f(index, stacked_top)` for every element.
///
/// `base` is the offset of the first element (the stack's top inset). This is the `O(n)` form of
/// [`compute_stacked_top`] applied to every entry at once.
pub fn for_each_stacked_top(
    base: u64,
    heights: impl IntoIterator<Item = u32>,
    mut f: impl FnMut(usize, u64),
) -> u64 {
    let mut top = base;
    for (i, height) in heights.into_iter().enumerate() {
        f(i, top);
        top = top.saturating_add(height as u64);
    }
    top
}
