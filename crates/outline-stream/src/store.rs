use crate::outline::OutlineItem;

/// One finalized slide with its stable position.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlideEntry {
    /// Zero-based position; always equal to the entry's array position.
    pub index: usize,
    /// Slide text.
    pub content: String,
}

impl SlideEntry {
    /// Downstream element addressing (`slide-<index>`).
    pub fn slide_id(&self) -> String {
        format!("slide-{}", self.index)
    }
}

/// Finalized outline for one document with index-preserving mutation.
///
/// Every mutation re-derives the contiguous zero-based `index` field on all
/// entries; `slide-<index>` addressing downstream depends on it.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutlineDocument {
    slides: Vec<SlideEntry>,
}

impl OutlineDocument {
    /// Builds a document from a finalized outline, assigning indices in
    /// presentation order.
    pub fn from_items(items: Vec<OutlineItem>) -> Self {
        let slides = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| SlideEntry {
                index,
                content: item.content,
            })
            .collect();
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[SlideEntry] {
        &self.slides
    }

    pub fn get(&self, index: usize) -> Option<&SlideEntry> {
        self.slides.get(index)
    }

    /// Inserts at `index` (clamped to the current length) and reindexes.
    pub fn insert_at(&mut self, index: usize, item: OutlineItem) {
        let index = index.min(self.slides.len());
        self.slides.insert(
            index,
            SlideEntry {
                index,
                content: item.content,
            },
        );
        self.reindex();
    }

    /// Removes the entry at `index` and reindexes.
    ///
    /// Returns `None` when `index` is out of range; the document is
    /// unchanged in that case.
    pub fn remove_at(&mut self, index: usize) -> Option<SlideEntry> {
        if index >= self.slides.len() {
            return None;
        }
        let removed = self.slides.remove(index);
        self.reindex();
        Some(removed)
    }

    fn reindex(&mut self) {
        for (position, slide) in self.slides.iter_mut().enumerate() {
            slide.index = position;
        }
    }
}
