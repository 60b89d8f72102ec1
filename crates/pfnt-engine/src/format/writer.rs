//! `.pfnt` file assembly
//!
//! Host-side builder used to prepare font files for the device and to
//! construct in-memory fonts in tests. Glyph entries are written in
//! ascending codepoint order with 24-bit bitmap offsets, matching the
//! layout the reader expects.

use std::path::Path;

use crate::rle;
use crate::Result;

use super::{FAMILY_NAME_LEN, FONT_MAGIC, FONT_VERSION, GLYPH_ENTRY_SIZE, HEADER_SIZE};

struct BuilderGlyph {
    codepoint: u32,
    width: u8,
    height: u8,
    advance_x: u8,
    x_offset: i8,
    y_offset: i8,
    /// One gray value (0-15) per pixel, row-major
    pixels: Vec<u8>,
}

/// Assembles a complete `.pfnt` file from raw glyph bitmaps
pub struct FontBuilder {
    family_name: String,
    font_height: u8,
    ascender: u16,
    descender: u16,
    glyphs: Vec<BuilderGlyph>,
}

impl FontBuilder {
    pub fn new(family_name: &str, font_height: u8, ascender: u16, descender: u16) -> Self {
        Self {
            family_name: family_name.to_owned(),
            font_height,
            ascender,
            descender,
            glyphs: Vec::new(),
        }
    }

    /// Add a glyph from 4-bit samples (one gray value 0-15 per pixel,
    /// row-major, `width * height` samples).
    ///
    /// Panics if the sample count does not match the dimensions.
    #[allow(clippy::too_many_arguments)]
    pub fn add_glyph(
        &mut self,
        codepoint: u32,
        width: u8,
        height: u8,
        advance_x: u8,
        x_offset: i8,
        y_offset: i8,
        pixels: &[u8],
    ) {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "glyph U+{codepoint:04X}: pixel count does not match dimensions"
        );
        self.glyphs.push(BuilderGlyph {
            codepoint,
            width,
            height,
            advance_x,
            x_offset,
            y_offset,
            pixels: pixels.to_vec(),
        });
    }

    /// Add a glyph from 8bpp samples, quantizing to 4 bits (`round(p / 17)`)
    #[allow(clippy::too_many_arguments)]
    pub fn add_glyph_8bpp(
        &mut self,
        codepoint: u32,
        width: u8,
        height: u8,
        advance_x: u8,
        x_offset: i8,
        y_offset: i8,
        pixels: &[u8],
    ) {
        let quantized: Vec<u8> = pixels
            .iter()
            .map(|&p| ((p as u16 + 8) / 17) as u8)
            .collect();
        self.add_glyph(codepoint, width, height, advance_x, x_offset, y_offset, &quantized);
    }

    /// Assemble the file bytes: header, entry table sorted by codepoint,
    /// then the concatenated RLE streams.
    pub fn build(&self) -> Vec<u8> {
        let mut glyphs: Vec<&BuilderGlyph> = self.glyphs.iter().collect();
        glyphs.sort_by_key(|g| g.codepoint);

        let streams: Vec<Vec<u8>> = glyphs
            .iter()
            .map(|g| {
                if g.width > 0 && g.height > 0 {
                    rle::encode(&g.pixels, g.width, g.height)
                } else {
                    Vec::new()
                }
            })
            .collect();

        let mut out = vec![0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&FONT_MAGIC.to_le_bytes());
        out[4] = FONT_VERSION;
        out[5] = self.font_height;
        out[6..10].copy_from_slice(&(glyphs.len() as u32).to_le_bytes());
        let name = self.family_name.as_bytes();
        let name_len = name.len().min(FAMILY_NAME_LEN);
        out[10..10 + name_len].copy_from_slice(&name[..name_len]);
        out[74..76].copy_from_slice(&self.ascender.to_le_bytes());
        out[76..78].copy_from_slice(&self.descender.to_le_bytes());

        let bitmap_base = HEADER_SIZE + glyphs.len() * GLYPH_ENTRY_SIZE;
        let mut offset = bitmap_base;
        for (glyph, stream) in glyphs.iter().zip(&streams) {
            out.extend_from_slice(&glyph.codepoint.to_le_bytes());
            out.push(glyph.width);
            out.push(glyph.height);
            out.push(glyph.advance_x);
            out.push(glyph.x_offset as u8);
            out.push(glyph.y_offset as u8);
            let off24 = (offset as u32) & 0x00FF_FFFF;
            out.extend_from_slice(&off24.to_le_bytes()[..3]);
            out.extend_from_slice(&(stream.len() as u32).to_le_bytes());
            offset += stream.len();
        }

        for stream in &streams {
            out.extend_from_slice(stream);
        }
        out
    }

    /// Write the assembled file to disk
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.build())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FontHeader, FontReader, GlyphEntry};

    #[test]
    fn test_build_layout() {
        let mut builder = FontBuilder::new("TestFamily", 16, 13, 3);
        // Added out of order; the table must come out sorted
        builder.add_glyph('B' as u32, 2, 2, 3, 0, 1, &[1, 2, 3, 4]);
        builder.add_glyph(' ' as u32, 0, 0, 5, 0, 0, &[]);
        builder.add_glyph('A' as u32, 2, 1, 3, -1, 0, &[7, 7]);

        let bytes = builder.build();
        let header = FontHeader::parse(&bytes).unwrap();
        assert_eq!(header.family_name, "TestFamily");
        assert_eq!(header.font_height, 16);
        assert_eq!(header.glyph_count, 3);
        assert_eq!(header.ascender, 13);
        assert_eq!(header.descender, 3);

        let mut r = FontReader::new(&bytes[HEADER_SIZE..]);
        let space = GlyphEntry::parse(&mut r).unwrap();
        let a = GlyphEntry::parse(&mut r).unwrap();
        let b = GlyphEntry::parse(&mut r).unwrap();

        assert_eq!(space.codepoint, ' ' as u32);
        assert_eq!(space.bitmap_size, 0);
        assert_eq!(a.codepoint, 'A' as u32);
        assert_eq!(a.x_offset, -1);
        assert_eq!(b.codepoint, 'B' as u32);
        assert_eq!(b.y_offset, 1);

        // Streams are laid out back to back after the table
        let bitmap_base = (HEADER_SIZE + 3 * GLYPH_ENTRY_SIZE) as u32;
        assert_eq!(space.bitmap_offset, bitmap_base);
        assert_eq!(a.bitmap_offset, bitmap_base);
        assert_eq!(b.bitmap_offset, a.bitmap_offset + a.bitmap_size);
        assert_eq!(
            bytes.len() as u32,
            b.bitmap_offset + b.bitmap_size
        );
    }

    #[test]
    fn test_8bpp_quantization() {
        let mut builder = FontBuilder::new("Q", 16, 13, 3);
        builder.add_glyph_8bpp('x' as u32, 4, 1, 5, 0, 0, &[0, 8, 9, 255]);
        // round(p / 17): 0, 0, 1, 15
        assert_eq!(builder.glyphs[0].pixels, vec![0, 0, 1, 15]);
    }

    #[test]
    #[should_panic(expected = "pixel count")]
    fn test_dimension_mismatch_panics() {
        let mut builder = FontBuilder::new("Bad", 16, 13, 3);
        builder.add_glyph('x' as u32, 4, 4, 5, 0, 0, &[1, 2, 3]);
    }
}
