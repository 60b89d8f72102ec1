//! Common-glyph cache
//!
//! Pre-populated once after load with the codepoints nearly every page uses
//! (ASCII printable range plus frequent CJK punctuation). Entries are never
//! evicted; the cache is dropped with the font.

use std::collections::HashMap;

use crate::glyph::DecodedGlyph;

/// Upper bound on preloaded glyphs
pub const COMMON_CACHE_MAX: usize = 256;

/// CJK punctuation preloaded alongside ASCII
pub const COMMON_CJK_PUNCTUATION: [u32; 20] = [
    0x3001, // 、
    0x3002, // 。
    0xFF0C, // ，
    0xFF1B, // ；
    0xFF1A, // ：
    0xFF01, // ！
    0xFF1F, // ？
    0xFF08, // （
    0xFF09, // ）
    0x3010, // 【
    0x3011, // 】
    0x300A, // 《
    0x300B, // 》
    0x201C, // “
    0x201D, // ”
    0x2018, // ‘
    0x2019, // ’
    0x2014, // —
    0x2026, // …
    0x00B7, // ·
];

/// Fixed preloaded glyph set with a codepoint → slot lookup table
#[derive(Debug, Default)]
pub struct CommonCache {
    glyphs: Vec<DecodedGlyph>,
    lookup: HashMap<u32, usize>,
}

impl CommonCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The codepoint list the engine preloads: ASCII 0x20-0x7E followed by
    /// the CJK punctuation set, capped at [`COMMON_CACHE_MAX`].
    pub fn preload_list() -> Vec<u32> {
        let mut list: Vec<u32> = (0x20..=0x7E).collect();
        list.extend_from_slice(&COMMON_CJK_PUNCTUATION);
        list.truncate(COMMON_CACHE_MAX);
        list
    }

    /// Insert a glyph, taking ownership of its bitmap
    pub fn insert(&mut self, glyph: DecodedGlyph) {
        self.lookup.insert(glyph.codepoint, self.glyphs.len());
        self.glyphs.push(glyph);
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.lookup.contains_key(&codepoint)
    }

    pub fn find(&self, codepoint: u32) -> Option<&DecodedGlyph> {
        self.lookup.get(&codepoint).map(|&idx| &self.glyphs[idx])
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
