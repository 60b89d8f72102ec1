//! Page-window cache
//!
//! A small sliding window of page slots. Each slot accumulates the distinct
//! glyphs used while laying out one page of text; when the visible window
//! moves, slots for pages outside the new window are reclaimed.

use crate::glyph::DecodedGlyph;

/// Number of page slots in the window
pub const PAGE_WINDOW: usize = 5;

/// Initial glyph capacity reserved when a slot first receives a glyph
const SLOT_INITIAL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct PageSlot {
    page_id: Option<i32>,
    glyphs: Vec<DecodedGlyph>,
}

/// Sliding window of per-page glyph slots
#[derive(Debug)]
pub struct PageCache {
    slots: [PageSlot; PAGE_WINDOW],
    center: Option<i32>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCache {
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
            center: None,
        }
    }

    /// Current window center page, if any
    pub fn center(&self) -> Option<i32> {
        self.center
    }

    /// Linear scan of every occupied slot for a codepoint
    pub fn find(&self, codepoint: u32) -> Option<&DecodedGlyph> {
        self.slots
            .iter()
            .filter(|slot| slot.page_id.is_some())
            .flat_map(|slot| slot.glyphs.iter())
            .find(|glyph| glyph.codepoint == codepoint)
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.find(codepoint).is_some()
    }

    /// Move the window center. Slots whose page falls outside
    /// `[center - PAGE_WINDOW/2, center + PAGE_WINDOW/2]` are reclaimed.
    pub fn set_center(&mut self, page_id: i32) {
        self.center = Some(page_id);

        let half = PAGE_WINDOW as i32 / 2;
        let new_start = page_id - half;
        let new_end = page_id + half;

        for slot in &mut self.slots {
            if let Some(pid) = slot.page_id {
                if pid < new_start || pid > new_end {
                    // TODO: hand evicted glyphs to the recycle pool instead
                    // of dropping them
                    slot.glyphs.clear();
                    slot.page_id = None;
                }
            }
        }
    }

    /// Find the slot for `page_id`, claiming a free one if needed.
    ///
    /// Returns false when every slot is occupied by other pages; the caller
    /// drops the add silently in that case.
    pub fn ensure_slot(&mut self, page_id: i32) -> bool {
        if self.slots.iter().any(|s| s.page_id == Some(page_id)) {
            return true;
        }
        if let Some(free) = self.slots.iter_mut().find(|s| s.page_id.is_none()) {
            free.page_id = Some(page_id);
            return true;
        }
        false
    }

    /// Whether the slot for `page_id` already holds a codepoint
    pub fn slot_contains(&self, page_id: i32, codepoint: u32) -> bool {
        self.slots
            .iter()
            .find(|s| s.page_id == Some(page_id))
            .is_some_and(|s| s.glyphs.iter().any(|g| g.codepoint == codepoint))
    }

    /// Append a glyph to the slot for `page_id`, taking ownership of its
    /// bitmap. No-op if the slot does not exist.
    pub fn push(&mut self, page_id: i32, glyph: DecodedGlyph) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.page_id == Some(page_id)) {
            if slot.glyphs.capacity() == 0 {
                slot.glyphs.reserve(SLOT_INITIAL_CAPACITY);
            }
            slot.glyphs.push(glyph);
        }
    }

    /// Total glyphs held across all slots
    pub fn len(&self) -> usize {
        self.slots.iter().map(|s| s.glyphs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Glyph count for one page's slot, if that page is resident
    pub fn page_len(&self, page_id: i32) -> Option<usize> {
        self.slots
            .iter()
            .find(|s| s.page_id == Some(page_id))
            .map(|s| s.glyphs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(codepoint: u32) -> DecodedGlyph {
        DecodedGlyph {
            codepoint,
            width: 2,
            height: 2,
            advance_x: 3,
            x_offset: 0,
            y_offset: 0,
            bitmap: vec![0x11, 0x22],
        }
    }

    #[test]
    fn test_add_and_find() {
        let mut cache = PageCache::new();
        assert!(cache.ensure_slot(3));
        cache.push(3, glyph('x' as u32));

        assert!(cache.contains('x' as u32));
        assert_eq!(cache.page_len(3), Some(1));
        assert!(!cache.contains('y' as u32));
    }

    #[test]
    fn test_window_eviction() {
        let mut cache = PageCache::new();
        for page in [7, 8, 10, 12, 13] {
            assert!(cache.ensure_slot(page));
            cache.push(page, glyph(page as u32));
        }

        cache.set_center(10);

        // Window is [8, 12]; pages 7 and 13 are reclaimed
        assert_eq!(cache.page_len(7), None);
        assert_eq!(cache.page_len(13), None);
        assert_eq!(cache.page_len(8), Some(1));
        assert_eq!(cache.page_len(10), Some(1));
        assert_eq!(cache.page_len(12), Some(1));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_all_slots_busy_rejects_new_page() {
        let mut cache = PageCache::new();
        for page in 0..PAGE_WINDOW as i32 {
            assert!(cache.ensure_slot(page));
        }
        assert!(!cache.ensure_slot(99));
        // Existing pages still resolve
        assert!(cache.ensure_slot(2));
    }

    #[test]
    fn test_eviction_frees_slot_for_reuse() {
        let mut cache = PageCache::new();
        for page in 0..PAGE_WINDOW as i32 {
            cache.ensure_slot(page);
            cache.push(page, glyph(page as u32));
        }

        cache.set_center(20);
        assert_eq!(cache.len(), 0);
        assert!(cache.ensure_slot(20));
    }
}
