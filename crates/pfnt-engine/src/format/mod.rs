//! `.pfnt` binary font format
//!
//! Layout (all integers little-endian):
//! - 128-byte header: magic, version, base pixel height, glyph count,
//!   family name, ascender/descender.
//! - Glyph table: `glyph_count` fixed 16-byte entries, codepoint ascending.
//! - Bitmap data: per-glyph RLE streams referenced by 24-bit offsets.

pub mod reader;
mod writer;

pub use reader::FontReader;
pub use writer::FontBuilder;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{FontError, Result};

/// File magic, the ASCII tag "PFNT" read as a little-endian u32
pub const FONT_MAGIC: u32 = 0x5446_4E50;
/// Supported format version
pub const FONT_VERSION: u8 = 1;
/// Size of the fixed file header in bytes
pub const HEADER_SIZE: usize = 128;
/// Size of one glyph table entry in bytes
pub const GLYPH_ENTRY_SIZE: usize = 16;
/// Length of the fixed family-name field
pub const FAMILY_NAME_LEN: usize = 64;

/// Parsed `.pfnt` file header
#[derive(Debug, Clone)]
pub struct FontHeader {
    /// Base pixel height the glyphs were rendered at
    pub font_height: u8,
    /// Number of entries in the glyph table
    pub glyph_count: u32,
    /// Font family name, NUL-trimmed UTF-8
    pub family_name: String,
    /// Pixels above the baseline
    pub ascender: u16,
    /// Pixels below the baseline
    pub descender: u16,
}

impl FontHeader {
    /// Parse and validate the 128-byte header.
    ///
    /// Fails with `BadMagic`/`BadVersion` on a foreign or unsupported file
    /// and `Truncated` if fewer than `HEADER_SIZE` bytes are available.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(FontError::Truncated);
        }
        let mut r = FontReader::new(data);

        let magic = r.read_u32()?;
        if magic != FONT_MAGIC {
            return Err(FontError::BadMagic(magic));
        }
        let version = r.read_u8()?;
        if version != FONT_VERSION {
            return Err(FontError::BadVersion(version));
        }

        let font_height = r.read_u8()?;
        let glyph_count = r.read_u32()?;
        let family_name = r.read_fixed_str(FAMILY_NAME_LEN)?;
        let ascender = r.read_u16()?;
        let descender = r.read_u16()?;
        r.skip(50)?; // reserved

        Ok(Self {
            font_height,
            glyph_count,
            family_name,
            ascender,
            descender,
        })
    }
}

/// One on-disk glyph table entry. Never mutated after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphEntry {
    pub codepoint: u32,
    pub width: u8,
    pub height: u8,
    pub advance_x: u8,
    pub x_offset: i8,
    pub y_offset: i8,
    /// Absolute file offset of the RLE stream (24-bit field widened)
    pub bitmap_offset: u32,
    /// RLE stream length in bytes
    pub bitmap_size: u32,
}

impl GlyphEntry {
    /// Parse one 16-byte glyph table entry
    pub fn parse(r: &mut FontReader<'_>) -> Result<Self> {
        Ok(Self {
            codepoint: r.read_u32()?,
            width: r.read_u8()?,
            height: r.read_u8()?,
            advance_x: r.read_u8()?,
            x_offset: r.read_i8()?,
            y_offset: r.read_i8()?,
            bitmap_offset: r.read_u24()?,
            bitmap_size: r.read_u32()?,
        })
    }
}

/// Fill `buf` from the source, mapping a short read to `Truncated`.
///
/// Used while reading the fixed-layout header and glyph table, where
/// running out of bytes means a malformed file rather than an I/O fault.
pub fn read_exact_or_truncated<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<()> {
    source.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FontError::Truncated
        } else {
            FontError::Io(e)
        }
    })
}

/// Read and validate only the header of a font file.
///
/// Cheap peek for font-listing UIs: no glyph table is read and no index
/// is built.
pub fn read_header(path: impl AsRef<Path>) -> Result<FontHeader> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; HEADER_SIZE];
    read_exact_or_truncated(&mut file, &mut buf)?;
    FontHeader::parse(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header_bytes() -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&FONT_MAGIC.to_le_bytes());
        buf[4] = FONT_VERSION;
        buf[5] = 32;
        buf[6..10].copy_from_slice(&1234u32.to_le_bytes());
        buf[10..13].copy_from_slice(b"Kai");
        buf[74..76].copy_from_slice(&26u16.to_le_bytes());
        buf[76..78].copy_from_slice(&6u16.to_le_bytes());
        buf
    }

    #[test]
    fn test_header_parse() {
        let header = FontHeader::parse(&sample_header_bytes()).unwrap();
        assert_eq!(header.font_height, 32);
        assert_eq!(header.glyph_count, 1234);
        assert_eq!(header.family_name, "Kai");
        assert_eq!(header.ascender, 26);
        assert_eq!(header.descender, 6);
    }

    #[test]
    fn test_header_bad_magic() {
        let mut buf = sample_header_bytes();
        buf[0] = b'X';
        match FontHeader::parse(&buf) {
            Err(FontError::BadMagic(_)) => {}
            other => panic!("expected BadMagic, got {other:?}"),
        }
    }

    #[test]
    fn test_header_bad_version() {
        let mut buf = sample_header_bytes();
        buf[4] = 9;
        match FontHeader::parse(&buf) {
            Err(FontError::BadVersion(9)) => {}
            other => panic!("expected BadVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_header_truncated() {
        let buf = sample_header_bytes();
        assert!(matches!(
            FontHeader::parse(&buf[..HEADER_SIZE - 1]),
            Err(FontError::Truncated)
        ));
    }

    #[test]
    fn test_glyph_entry_parse() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x4E2Du32.to_le_bytes());
        bytes.push(30); // width
        bytes.push(31); // height
        bytes.push(32); // advance_x
        bytes.push(1i8 as u8); // x_offset
        bytes.push((-3i8) as u8); // y_offset
        bytes.extend_from_slice(&[0x10, 0x20, 0x03]); // offset 0x032010
        bytes.extend_from_slice(&99u32.to_le_bytes());

        let mut r = FontReader::new(&bytes);
        let entry = GlyphEntry::parse(&mut r).unwrap();
        assert_eq!(entry.codepoint, 0x4E2D);
        assert_eq!(entry.width, 30);
        assert_eq!(entry.height, 31);
        assert_eq!(entry.advance_x, 32);
        assert_eq!(entry.x_offset, 1);
        assert_eq!(entry.y_offset, -3);
        assert_eq!(entry.bitmap_offset, 0x032010);
        assert_eq!(entry.bitmap_size, 99);
    }
}
