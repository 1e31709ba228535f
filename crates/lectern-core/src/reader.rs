//! Reading position, table of contents and search over converted documents.
//!
//! Positions are plain numbers (pixels in a browser, line numbers on a
//! terminal); nothing here knows about a display surface.

use serde::{Deserialize, Serialize};

use crate::markdown::Block;

/// Distance below the viewport top at which a heading counts as reached.
pub const DEFAULT_HEADER_OFFSET: f64 = 90.0;

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub level: u8,
    /// Anchor id, equal to the heading slug.
    pub id: String,
    /// Heading text without markup.
    pub title: String,
    /// Index of the heading block in the document.
    pub block: usize,
}

/// Table of contents in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toc {
    entries: Vec<TocEntry>,
}

impl Toc {
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let entries = blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| match block {
                Block::Heading { level, slug, .. } => Some(TocEntry {
                    level: *level,
                    id: slug.clone(),
                    title: block.plain_text(),
                    block: index,
                }),
                _ => None,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TocEntry> {
        self.entries.get(index)
    }

    /// Index of the first entry with this id.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Index of the last heading at or before a block index, 0 if none.
    pub fn entry_for_block(&self, block: usize) -> usize {
        let tops: Vec<f64> = self.entries.iter().map(|e| e.block as f64).collect();
        current_heading_index(&tops, block as f64, 0.0)
    }
}

/// Index of the heading the reader is in.
///
/// `heading_tops` are the headings' offsets from the document top in
/// document order. The result is the last heading whose top is at or above
/// `scroll_y + header_offset`, or 0 when none is.
pub fn current_heading_index(heading_tops: &[f64], scroll_y: f64, header_offset: f64) -> usize {
    let line = scroll_y + header_offset;
    let mut index = 0;
    for (i, top) in heading_tops.iter().enumerate() {
        if *top <= line {
            index = i;
        } else {
            break;
        }
    }
    index
}

/// Move `delta` headings from `current`, clamped to the available range.
pub fn step_heading(current: usize, delta: isize, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let target = current as isize + delta;
    Some(target.clamp(0, count as isize - 1) as usize)
}

/// Fraction of the document scrolled past, in `[0, 1]`.
pub fn progress_ratio(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let scrollable = scroll_height - client_height + 0.0001;
    (scroll_top / scrollable).clamp(0.0, 1.0)
}

/// Indices of headings and paragraphs whose text contains `query`.
///
/// The query is trimmed; an empty query matches nothing.
pub fn search(blocks: &[Block], query: &str) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| matches!(b, Block::Heading { .. } | Block::Paragraph { .. }))
        .filter(|(_, b)| b.plain_text().contains(query))
        .map(|(i, _)| i)
        .collect()
}

/// Table of contents plus the highlighted entry.
#[derive(Debug, Clone, Default)]
pub struct ReaderState {
    toc: Toc,
    active: Option<usize>,
}

impl ReaderState {
    pub fn new(toc: Toc) -> Self {
        Self { toc, active: None }
    }

    pub fn from_blocks(blocks: &[Block]) -> Self {
        Self::new(Toc::from_blocks(blocks))
    }

    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    pub fn active(&self) -> Option<&TocEntry> {
        self.active.and_then(|i| self.toc.get(i))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Highlight the heading at the given scroll position.
    pub fn on_scroll(
        &mut self,
        heading_tops: &[f64],
        scroll_y: f64,
        header_offset: f64,
    ) -> Option<&TocEntry> {
        if self.toc.is_empty() {
            return None;
        }
        self.active = Some(current_heading_index(heading_tops, scroll_y, header_offset));
        self.active()
    }

    /// Highlight a heading by id. Unknown ids leave the state unchanged.
    pub fn jump_to(&mut self, id: &str) -> Option<&TocEntry> {
        let index = self.toc.position_of(id)?;
        self.active = Some(index);
        self.active()
    }

    /// Move to the previous (`-1`) or next (`+1`) heading.
    pub fn step(&mut self, delta: isize) -> Option<&TocEntry> {
        let current = self.active.unwrap_or(0);
        self.active = Some(step_heading(current, delta, self.toc.len())?);
        self.active()
    }
}
