//! Recycle pool
//!
//! A bounded glyph pool with LRU eviction, the last stop before falling
//! back to a file decode. Usage order is tracked with a monotonic tick per
//! key; inserting at capacity evicts the stalest key first.

use std::collections::HashMap;

use crate::glyph::DecodedGlyph;

/// Default pool capacity
pub const RECYCLE_POOL_MAX: usize = 1500;

/// Bounded LRU glyph pool
#[derive(Debug)]
pub struct RecyclePool {
    glyphs: HashMap<u32, DecodedGlyph>,
    stamps: HashMap<u32, u64>,
    tick: u64,
    capacity: usize,
}

impl RecyclePool {
    /// Create a pool bounded at `capacity` glyphs
    pub fn new(capacity: usize) -> Self {
        Self {
            glyphs: HashMap::with_capacity(capacity),
            stamps: HashMap::with_capacity(capacity),
            tick: 0,
            capacity,
        }
    }

    /// Promote a codepoint to most-recently-used. Returns whether it is
    /// present.
    pub fn touch(&mut self, codepoint: u32) -> bool {
        if self.glyphs.contains_key(&codepoint) {
            self.tick += 1;
            self.stamps.insert(codepoint, self.tick);
            true
        } else {
            false
        }
    }

    /// Borrow a pooled glyph without changing its usage order
    pub fn get(&self, codepoint: u32) -> Option<&DecodedGlyph> {
        self.glyphs.get(&codepoint)
    }

    /// Insert a glyph, taking ownership of its bitmap.
    ///
    /// At capacity, the least-recently-used glyph is evicted first. If the
    /// codepoint is already pooled, its entry is replaced and re-stamped
    /// rather than duplicated.
    pub fn insert(&mut self, glyph: DecodedGlyph) {
        let codepoint = glyph.codepoint;
        if !self.glyphs.contains_key(&codepoint) && self.glyphs.len() >= self.capacity {
            self.evict_lru();
        }
        self.tick += 1;
        self.stamps.insert(codepoint, self.tick);
        self.glyphs.insert(codepoint, glyph);
    }

    fn evict_lru(&mut self) {
        if let Some((&victim, _)) = self.stamps.iter().min_by_key(|&(_, tick)| *tick) {
            self.glyphs.remove(&victim);
            self.stamps.remove(&victim);
        }
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.glyphs.contains_key(&codepoint)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(codepoint: u32) -> DecodedGlyph {
        DecodedGlyph {
            codepoint,
            width: 2,
            height: 1,
            advance_x: 3,
            x_offset: 0,
            y_offset: 0,
            bitmap: vec![codepoint as u8],
        }
    }

    #[test]
    fn test_insert_get() {
        let mut pool = RecyclePool::new(8);
        pool.insert(glyph(100));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(100).unwrap().codepoint, 100);
        assert!(pool.get(200).is_none());
    }

    #[test]
    fn test_capacity_evicts_lru() {
        let mut pool = RecyclePool::new(3);
        for cp in [1, 2, 3, 4] {
            pool.insert(glyph(cp));
        }
        assert_eq!(pool.len(), 3);
        // 1 was the least recently used
        assert!(!pool.contains(1));
        assert!(pool.contains(2));
        assert!(pool.contains(4));
    }

    #[test]
    fn test_touch_changes_eviction_order() {
        let mut pool = RecyclePool::new(3);
        let (a, b, c, d) = (10, 11, 12, 13);
        pool.insert(glyph(a));
        pool.insert(glyph(b));
        pool.insert(glyph(c));

        assert!(pool.touch(a));
        pool.insert(glyph(d));

        // B was stalest after A's promotion, so B went, not A
        assert!(pool.contains(a));
        assert!(!pool.contains(b));
        assert!(pool.contains(c));
        assert!(pool.contains(d));
    }

    #[test]
    fn test_touch_missing() {
        let mut pool = RecyclePool::new(3);
        assert!(!pool.touch(42));
    }

    #[test]
    fn test_duplicate_insert_replaces() {
        let mut pool = RecyclePool::new(3);
        pool.insert(glyph(7));
        let mut newer = glyph(7);
        newer.bitmap = vec![0xEE];
        pool.insert(newer);

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(7).unwrap().bitmap, vec![0xEE]);
    }

    #[test]
    fn test_duplicate_insert_at_capacity_does_not_evict() {
        let mut pool = RecyclePool::new(3);
        pool.insert(glyph(1));
        pool.insert(glyph(2));
        pool.insert(glyph(3));
        pool.insert(glyph(2));

        assert_eq!(pool.len(), 3);
        assert!(pool.contains(1));
        assert!(pool.contains(3));
    }
}
