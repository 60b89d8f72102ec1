//! Font engine
//!
//! Owns the open font source, the codepoint index, and the three cache
//! tiers, and drives the lookup protocol: page cache → common cache →
//! recycle pool → file decode. Designed for single-threaded synchronous
//! use; every mutating operation takes `&mut self`, so cache mutation is
//! structurally non-reentrant.

use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::cache::{CacheStats, CommonCache, PageCache, RECYCLE_POOL_MAX, RecyclePool};
use crate::format::{
    FontHeader, FontReader, GLYPH_ENTRY_SIZE, GlyphEntry, HEADER_SIZE, read_exact_or_truncated,
};
use crate::glyph::{DecodedGlyph, ScaledGlyph, packed_row_bytes};
use crate::index::GlyphIndex;
use crate::{rle, scale, Result};

#[derive(Debug, Default)]
struct LookupCounters {
    page_hits: u64,
    common_hits: u64,
    recycle_hits: u64,
    file_decodes: u64,
    misses: u64,
}

/// A loaded font: header, codepoint index, cache tiers, and the open
/// source for on-demand bitmap reads.
///
/// Constructed by [`FontEngine::load`] (or [`FontEngine::from_source`] for
/// non-file storage); unloading is dropping the value.
pub struct FontEngine<R: Read + Seek = File> {
    source: R,
    header: FontHeader,
    index: GlyphIndex,
    common: CommonCache,
    pages: PageCache,
    recycle: Option<RecyclePool>,
    counters: LookupCounters,
}

impl FontEngine<File> {
    /// Open and index a `.pfnt` font file. The file stays open for
    /// on-demand bitmap reads; it is not read into memory wholesale.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_source(file)
    }
}

impl<R: Read + Seek> FontEngine<R> {
    /// Index a font from any seekable byte source.
    ///
    /// Reads and validates the header, then the whole glyph table; a short
    /// read or a bad magic/version fails with no partial engine state.
    pub fn from_source(mut source: R) -> Result<Self> {
        let mut header_buf = [0u8; HEADER_SIZE];
        read_exact_or_truncated(&mut source, &mut header_buf)?;
        let header = FontHeader::parse(&header_buf)?;

        let mut index = GlyphIndex::with_capacity(header.glyph_count as usize);
        let mut entry_buf = [0u8; GLYPH_ENTRY_SIZE];
        for _ in 0..header.glyph_count {
            read_exact_or_truncated(&mut source, &mut entry_buf)?;
            let mut r = FontReader::new(&entry_buf);
            index.insert(GlyphEntry::parse(&mut r)?);
        }

        tracing::info!(
            "Loaded font '{}': height={}, {} glyphs indexed",
            header.family_name,
            header.font_height,
            index.len()
        );

        Ok(Self {
            source,
            header,
            index,
            common: CommonCache::new(),
            pages: PageCache::new(),
            recycle: None,
            counters: LookupCounters::default(),
        })
    }

    /// The parsed file header
    pub fn header(&self) -> &FontHeader {
        &self.header
    }

    /// On-disk table entry for a codepoint, if the font covers it
    pub fn glyph_entry(&self, codepoint: u32) -> Option<&GlyphEntry> {
        self.index.find(codepoint)
    }

    /// Look up a glyph through the cache hierarchy.
    ///
    /// Probes the page cache, then the common cache, then the recycle pool
    /// (promoting a hit to most-recently-used), and finally decodes from
    /// the file. Cache hits borrow from the owning tier; a fresh file
    /// decode returns an owned glyph that is NOT retained anywhere;
    /// callers that want it cached must move it into a tier themselves.
    ///
    /// `None` means the codepoint is absent from the font (or its bitmap
    /// could not be read); render a fallback like [`DecodedGlyph::tofu`].
    pub fn get_glyph(&mut self, codepoint: u32) -> Option<Cow<'_, DecodedGlyph>> {
        if self.pages.contains(codepoint) {
            self.counters.page_hits += 1;
            return self.pages.find(codepoint).map(Cow::Borrowed);
        }

        if self.common.contains(codepoint) {
            self.counters.common_hits += 1;
            return self.common.find(codepoint).map(Cow::Borrowed);
        }

        if let Some(pool) = self.recycle.as_mut() {
            if pool.touch(codepoint) {
                self.counters.recycle_hits += 1;
                return self.recycle.as_ref().and_then(|p| p.get(codepoint)).map(Cow::Borrowed);
            }
        }

        let Some(entry) = self.index.find(codepoint).copied() else {
            self.counters.misses += 1;
            return None;
        };
        match self.decode_entry(&entry) {
            Ok(glyph) => {
                self.counters.file_decodes += 1;
                Some(Cow::Owned(glyph))
            }
            Err(err) => {
                tracing::warn!("Failed to decode glyph U+{codepoint:04X}: {err}");
                self.counters.misses += 1;
                None
            }
        }
    }

    /// Look up a glyph and rescale it to `target_size` pixels.
    ///
    /// The scale factor is clamped to 0.5-1.0 of the font's base height.
    /// At the base size the packed bitmap is unpacked 1:1; below it, the
    /// area-weighted box filter resamples. Metrics scale linearly with
    /// round-to-nearest. The returned bitmap is always a fresh allocation
    /// owned by the caller.
    pub fn get_scaled_glyph(&mut self, codepoint: u32, target_size: u8) -> Option<ScaledGlyph> {
        let base_height = self.header.font_height;
        let base = self.get_glyph(codepoint)?;

        let scale = (target_size as f32 / base_height as f32).clamp(0.5, 1.0);
        let advance_x = (base.advance_x as f32 * scale).round() as u8;
        let x_offset = (base.x_offset as f32 * scale).round() as i8;
        let y_offset = (base.y_offset as f32 * scale).round() as i8;

        if base.is_empty() {
            return Some(ScaledGlyph {
                codepoint,
                width: 0,
                height: 0,
                advance_x,
                x_offset,
                y_offset,
                bitmap: Vec::new(),
            });
        }

        if scale >= 0.999 {
            let bitmap = scale::unpack_8bpp(&base.bitmap, base.width, base.height);
            return Some(ScaledGlyph {
                codepoint,
                width: base.width,
                height: base.height,
                advance_x,
                x_offset,
                y_offset,
                bitmap,
            });
        }

        let dst_w = ((base.width as f32 * scale).round() as u8).max(1);
        let dst_h = ((base.height as f32 * scale).round() as u8).max(1);
        let mut bitmap = vec![0u8; dst_w as usize * dst_h as usize];
        scale::scale_area_weighted(&base.bitmap, base.width, base.height, &mut bitmap, dst_w, dst_h);
        Some(ScaledGlyph {
            codepoint,
            width: dst_w,
            height: dst_h,
            advance_x,
            x_offset,
            y_offset,
            bitmap,
        })
    }

    /// Preload the common cache (ASCII printable range + CJK punctuation).
    ///
    /// Call once after loading, before general use. Codepoints the font
    /// does not cover are skipped. Returns the number of glyphs cached.
    pub fn init_common_cache(&mut self) -> usize {
        let list = CommonCache::preload_list();
        tracing::info!("Preloading common cache with {} codepoints", list.len());

        let mut loaded = 0;
        for codepoint in list {
            let Some(glyph) = self.get_glyph(codepoint) else {
                continue;
            };
            let owned = glyph.into_owned();
            self.common.insert(owned);
            loaded += 1;
        }

        tracing::info!("Common cache ready: {loaded} glyphs");
        loaded
    }

    /// Initialize the recycle pool. Must be called before
    /// [`FontEngine::recycle_add`]; until then adds are dropped and
    /// lookups skip the pool.
    pub fn init_recycle_pool(&mut self) {
        self.recycle = Some(RecyclePool::new(RECYCLE_POOL_MAX));
    }

    /// Hand a glyph to the recycle pool, transferring ownership of its
    /// bitmap. Silently dropped if the pool was never initialized.
    pub fn recycle_add(&mut self, glyph: DecodedGlyph) {
        if let Some(pool) = self.recycle.as_mut() {
            pool.insert(glyph);
        }
    }

    /// Move the page window center as pagination proceeds. Slots for pages
    /// outside the new window are reclaimed.
    pub fn set_page(&mut self, page_id: i32) {
        tracing::debug!("Page window centered on {page_id}");
        self.pages.set_center(page_id);
    }

    /// Record that a page uses a codepoint, decoding it into the page's
    /// slot.
    ///
    /// Allocates a slot for `page_id` only if one is free; when every slot
    /// belongs to another page the add is silently dropped. Codepoints
    /// already in the slot, or absent from the font, are no-ops. The decode
    /// goes straight to the file, bypassing the lookup protocol, so the
    /// slot owns an independent copy.
    pub fn page_cache_add(&mut self, page_id: i32, codepoint: u32) {
        if !self.pages.ensure_slot(page_id) {
            return;
        }
        if self.pages.slot_contains(page_id, codepoint) {
            return;
        }
        let Some(entry) = self.index.find(codepoint).copied() else {
            return;
        };
        match self.decode_entry(&entry) {
            Ok(glyph) => self.pages.push(page_id, glyph),
            Err(err) => {
                tracing::warn!(
                    "Failed to decode glyph U+{codepoint:04X} for page {page_id}: {err}"
                );
            }
        }
    }

    /// Lookup and occupancy counters across the cache tiers
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            page_hits: self.counters.page_hits,
            common_hits: self.counters.common_hits,
            recycle_hits: self.counters.recycle_hits,
            file_decodes: self.counters.file_decodes,
            misses: self.counters.misses,
            common_len: self.common.len(),
            page_len: self.pages.len(),
            recycle_len: self.recycle.as_ref().map_or(0, RecyclePool::len),
        }
    }

    /// Seek to an entry's bitmap, read the RLE stream, and decode it.
    ///
    /// Zero-area entries (space) succeed with no bitmap. A pixel-count
    /// mismatch from the codec is logged, not propagated: a partially
    /// decoded glyph beats dropped text.
    fn decode_entry(&mut self, entry: &GlyphEntry) -> Result<DecodedGlyph> {
        if entry.width == 0 || entry.height == 0 {
            return Ok(DecodedGlyph {
                codepoint: entry.codepoint,
                width: entry.width,
                height: entry.height,
                advance_x: entry.advance_x,
                x_offset: entry.x_offset,
                y_offset: entry.y_offset,
                bitmap: Vec::new(),
            });
        }

        let mut rle_buf = vec![0u8; entry.bitmap_size as usize];
        self.source.seek(SeekFrom::Start(entry.bitmap_offset as u64))?;
        self.source.read_exact(&mut rle_buf)?;

        let mut bitmap = vec![0u8; packed_row_bytes(entry.width) * entry.height as usize];
        let pixels = rle::decode(&rle_buf, entry.width, entry.height, &mut bitmap);
        let expected = entry.width as usize * entry.height as usize;
        if pixels != expected {
            tracing::warn!(
                "RLE decode mismatch for U+{:04X}: got {pixels}, expected {expected}",
                entry.codepoint
            );
        }

        Ok(DecodedGlyph {
            codepoint: entry.codepoint,
            width: entry.width,
            height: entry.height,
            advance_x: entry.advance_x,
            x_offset: entry.x_offset,
            y_offset: entry.y_offset,
            bitmap,
        })
    }
}

/// Non-recursive scan of a directory for `.pfnt` files, sorted by path.
/// A missing or unreadable directory yields an empty list.
pub fn scan_fonts(dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut fonts = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return fonts;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let is_pfnt = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pfnt"));
        if is_pfnt && path.is_file() {
            fonts.push(path);
        }
    }
    fonts.sort();
    fonts
}
