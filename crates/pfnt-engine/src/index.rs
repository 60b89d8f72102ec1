//! Unicode codepoint index
//!
//! Maps codepoints to their on-disk glyph table entries. Built once during
//! load, read-only afterwards.

use std::collections::HashMap;

use crate::format::GlyphEntry;

/// Codepoint → glyph entry lookup table
#[derive(Debug, Default)]
pub struct GlyphIndex {
    map: HashMap<u32, GlyphEntry>,
}

impl GlyphIndex {
    /// Create an index pre-sized for the expected glyph count
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            map: HashMap::with_capacity(expected),
        }
    }

    /// Insert an entry under its codepoint.
    ///
    /// If the glyph table carries the same codepoint twice, the last entry
    /// read wins.
    pub fn insert(&mut self, entry: GlyphEntry) {
        self.map.insert(entry.codepoint, entry);
    }

    /// Look up the table entry for a codepoint. Codepoints absent from the
    /// font yield `None`; callers treat that as "render a fallback glyph",
    /// not as an error.
    pub fn find(&self, codepoint: u32) -> Option<&GlyphEntry> {
        self.map.get(&codepoint)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
