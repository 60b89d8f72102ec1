//! PFNT Bitmap Font Engine
//!
//! This crate turns compressed `.pfnt` bitmap font files into ready-to-blit
//! grayscale glyphs for e-paper text rendering:
//! - Binary format parsing (128-byte header + 16-byte glyph table)
//! - Unicode codepoint index for on-demand glyph decoding
//! - Run-length decoding into packed 4bpp bitmaps
//! - Three cache tiers (common set, page window, LRU recycle pool)
//! - Area-weighted rescaling to smaller on-screen sizes

pub mod cache;
pub mod engine;
pub mod format;
pub mod glyph;
pub mod index;
pub mod rle;
pub mod scale;

pub use cache::{CacheStats, CommonCache, PageCache, RecyclePool};
pub use engine::{FontEngine, scan_fonts};
pub use format::{FontBuilder, FontHeader, GlyphEntry, read_header};
pub use glyph::{DecodedGlyph, ScaledGlyph};
pub use index::GlyphIndex;

/// Font engine error types
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("bad font magic 0x{0:08X}")]
    BadMagic(u32),

    #[error("unsupported font version {0}")]
    BadVersion(u8),

    #[error("truncated font data")]
    Truncated,

    #[error("font i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FontError>;
