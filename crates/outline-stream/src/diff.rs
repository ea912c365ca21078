use crate::outline::OutlineItem;

/// Lowest index at which two outline snapshots disagree.
///
/// An index present on only one side counts as a change at that index,
/// which also flags newly appended items. Returns `None` when the
/// snapshots agree.
pub fn first_changed_index(prev: &[OutlineItem], next: &[OutlineItem]) -> Option<usize> {
    let max_len = prev.len().max(next.len());
    (0..max_len).find(|&i| match (prev.get(i), next.get(i)) {
        (Some(a), Some(b)) => a.content != b.content,
        _ => true,
    })
}

/// Forward-only progress cursor for one stream session.
///
/// `active` never decreases once set and `high_water` is non-decreasing for
/// the life of a session, even when decoded content shrinks or an earlier
/// item is edited after a later one was marked active. Consumers rely on
/// this forward-only progress indication.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamPointers {
    /// Item currently believed to be under active generation.
    pub active: Option<usize>,
    /// Highest active index reached so far, `-1` before any item was active.
    pub high_water: i64,
}

impl Default for StreamPointers {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamPointers {
    /// Session-start state: no active item, high-water mark at `-1`.
    pub const fn new() -> Self {
        Self {
            active: None,
            high_water: -1,
        }
    }

    /// Advances the cursor for a newly decoded snapshot.
    ///
    /// With no changed index the cursor stays put; a changed index behind
    /// the current cursor is clamped to it.
    pub fn advance(&mut self, changed_index: Option<usize>) {
        let next_active = match (changed_index, self.active) {
            (Some(changed), Some(current)) => Some(changed.max(current)),
            (Some(changed), None) => Some(changed),
            (None, current) => current,
        };
        if let Some(next) = next_active {
            self.active = Some(next);
            self.high_water = self.high_water.max(next as i64);
        }
    }

    /// Resets to the session-start state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
