use crate::{
    refs::{ObjectReferences, RefType},
    FlashcardError, Pt,
};
use id_arena::Id;
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use pdf_writer::{
    types::{CidFontType, FontFlags, SystemInfo},
    Filter, Finish, Name, Pdf, Ref, Str,
};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

/// Width used for characters that aren't in a built-in font's width table, in 1/1000 em
const FALLBACK_WIDTH: u16 = 556;

/// Helvetica advance widths for ASCII 0x20..=0x7E, in 1/1000 em (from the Adobe AFM)
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 0x20..=0x7E, in 1/1000 em (from the Adobe AFM)
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// One of the standard PDF fonts that every viewer ships with. These are never embedded,
/// only referenced by name, and are limited to the WinAnsi character set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    /// The PostScript name of the font, as referenced by the PDF
    pub fn base_font(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of a character in 1/1000 em
    pub fn advance(&self, ch: char) -> u16 {
        let table = match self {
            BuiltinFont::Helvetica => &HELVETICA_WIDTHS,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match winansi_byte(ch) {
            Some(b @ 0x20..=0x7e) => table[(b - 0x20) as usize],
            Some(0x91 | 0x92) => match self {
                BuiltinFont::Helvetica => 222,
                BuiltinFont::HelveticaBold => 278,
            },
            Some(0x93 | 0x94) => match self {
                BuiltinFont::Helvetica => 333,
                BuiltinFont::HelveticaBold => 500,
            },
            Some(0x95) => 350,
            Some(0x85 | 0x97) => 1000,
            Some(0xa0) => 278,
            // not representable: encoded as '?'
            None => table[('?' as u8 - 0x20) as usize],
            Some(_) => FALLBACK_WIDTH,
        }
    }
}

/// Map a character onto its WinAnsiEncoding code, if it has one
fn winansi_byte(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' => Some(ch as u8),
        '\u{a0}'..='\u{ff}' => Some(ch as u32 as u8),
        '€' => Some(0x80),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        _ => None,
    }
}

/// A parsed TTF or OTF font, embedded in its entirety in the generated PDF. Large fonts may
/// dramatically increase the size of the output.
pub struct EmbeddedFont {
    pub face: OwnedFace,
}

/// A font that text can be drawn with. Fonts are stored "globally" within a
/// [crate::Document] and referred to by their [Id].
pub enum Font {
    Builtin(BuiltinFont),
    Embedded(EmbeddedFont),
}

impl Font {
    /// Use one of the standard PDF fonts
    pub fn builtin(font: BuiltinFont) -> Font {
        Font::Builtin(font)
    }

    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, FlashcardError> {
        let face = OwnedFace::from_vec(bytes, 0)?;
        Ok(Font::Embedded(EmbeddedFont { face }))
    }

    /// Calculate the width of a string of text at the given font size, as it will be drawn
    /// by [Font::encode]. Newlines contribute nothing; characters the font can't draw are
    /// measured as their replacement.
    pub fn width_of(&self, text: &str, size: Pt) -> Pt {
        match self {
            Font::Builtin(font) => {
                let units: u32 = text
                    .chars()
                    .filter(|ch| *ch != '\n')
                    .map(|ch| font.advance(ch) as u32)
                    .sum();
                size * (units as f32 / 1000.0)
            }
            Font::Embedded(font) => {
                let face = font.face.as_face_ref();
                let scaling = size / face.units_per_em() as f32;
                text.chars()
                    .filter(|ch| *ch != '\n')
                    .map(|ch| GlyphId(font.glyph_id_or_replacement(ch)))
                    .map(|gid| scaling * face.glyph_hor_advance(gid).unwrap_or_default() as f32)
                    .sum()
            }
        }
    }

    /// Write `text` as a PDF string operand suitable for `Tj`
    pub(crate) fn encode<W: Write>(&self, text: &str, out: &mut W) -> std::io::Result<()> {
        match self {
            Font::Builtin(_) => {
                out.write_all(b"(")?;
                for ch in text.chars().filter(|ch| *ch != '\n') {
                    match winansi_byte(ch).unwrap_or(b'?') {
                        b @ (b'(' | b')' | b'\\') => out.write_all(&[b'\\', b])?,
                        b @ 0x20..=0x7e => out.write_all(&[b])?,
                        b => write!(out, "\\{b:03o}")?,
                    }
                }
                out.write_all(b")")
            }
            Font::Embedded(font) => {
                out.write_all(b"<")?;
                for ch in text.chars().filter(|ch| *ch != '\n') {
                    write!(out, "{:04x}", font.glyph_id_or_replacement(ch))?;
                }
                out.write_all(b">")
            }
        }
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        id: Id<Font>,
        writer: &mut Pdf,
    ) -> Result<(), FlashcardError> {
        let font_index = id.index();
        let font_id = refs.gen(RefType::Font(font_index));
        match self {
            Font::Builtin(font) => {
                writer
                    .type1_font(font_id)
                    .base_font(Name(font.base_font().as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
            }
            Font::Embedded(font) => {
                let cid_font_id = font.write_cid(refs, font_index, writer)?;
                let to_unicode_id = font.write_to_unicode(refs, font_index, writer);

                let mut type0 = writer.type0_font(font_id);
                type0.base_font(Name(format!("F{font_index}").as_bytes()));
                type0.encoding_predefined(Name(b"Identity-H"));
                type0.descendant_font(cid_font_id);
                type0.to_unicode(to_unicode_id);
            }
        }
        Ok(())
    }
}

impl EmbeddedFont {
    fn name_entry(&self, name_id: u16) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    fn glyph_id_or_replacement(&self, ch: char) -> u16 {
        let face = self.face.as_face_ref();
        face.glyph_index(ch)
            .or_else(|| face.glyph_index('\u{FFFD}'))
            .or_else(|| face.glyph_index('?'))
            .map(|gid| gid.0)
            .unwrap_or(0)
    }

    /// Every glyph reachable from a unicode cmap subtable, keyed (and sorted) by glyph id
    fn cmap_glyphs(&self) -> BTreeMap<u16, char> {
        let mut map: BTreeMap<u16, char> = BTreeMap::new();
        let Some(cmap) = self.face.as_face_ref().tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        map
    }

    /// (advance width, height) of each glyph in font units
    fn glyph_metrics(&self, glyphs: &BTreeMap<u16, char>) -> BTreeMap<u16, (u16, i16)> {
        let face = self.face.as_face_ref();
        glyphs
            .keys()
            .filter_map(|&gid| {
                let advance = face.glyph_hor_advance(GlyphId(gid))?;
                let height = face
                    .glyph_bounding_box(GlyphId(gid))
                    .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                    .unwrap_or(1000);
                Some((gid, (advance, height)))
            })
            .collect()
    }

    fn write_cid(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Result<Ref, FlashcardError> {
        let glyphs = self.cmap_glyphs();
        let metrics = self.glyph_metrics(&glyphs);
        let font_descriptor_id = self.write_descriptor(refs, font_index, &metrics, writer)?;

        let id = refs.gen(RefType::CidFont(font_index));
        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(CidFontType::Type2);
        cid_font.base_font(Name(format!("F{font_index}").as_bytes()));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        // the most common advance becomes the default width
        let mut width_counts: HashMap<u16, usize> = HashMap::new();
        for (advance, _) in metrics.values() {
            *width_counts.entry(*advance).or_insert(0) += 1;
        }
        let default_width = width_counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&advance, _)| advance as f32 * scaling)
            .unwrap_or(1000.0);

        let mut widths = cid_font.widths();
        let mut run_start: Option<u16> = None;
        let mut run: Vec<f32> = Vec::new();
        for (&gid, &(advance, _)) in metrics.iter() {
            match run_start {
                Some(start) if start as usize + run.len() == gid as usize => {}
                Some(start) => {
                    widths.consecutive(start, run.drain(..));
                    run_start = Some(gid);
                }
                None => run_start = Some(gid),
            }
            run.push(advance as f32 * scaling);
        }
        if let Some(start) = run_start {
            widths.consecutive(start, run.drain(..));
        }
        widths.finish();

        cid_font.default_width(default_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        Ok(id)
    }

    fn write_descriptor(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        metrics: &BTreeMap<u16, (u16, i16)>,
        writer: &mut Pdf,
    ) -> Result<Ref, FlashcardError> {
        let name = self
            .name_entry(owned_ttf_parser::name_id::POST_SCRIPT_NAME)
            .or_else(|| self.name_entry(owned_ttf_parser::name_id::FULL_NAME))
            .ok_or(FlashcardError::UnnamedFont("name"))?;
        let family = self
            .name_entry(owned_ttf_parser::name_id::FAMILY)
            .ok_or(FlashcardError::UnnamedFont("family"))?;

        let font_data_id = refs.gen(RefType::FontData(font_index));
        writer
            .stream(font_data_id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        let face = self.face.as_face_ref();
        let scaling = 1000.0 / face.units_per_em() as f32;

        let max_width = metrics.values().map(|&(w, _)| w).max().unwrap_or_default();
        let max_height = metrics.values().map(|&(_, h)| h).max().unwrap_or_default();
        let sum_width: usize = metrics.values().map(|&(w, _)| w as usize).sum();
        let avg_width = sum_width as f32 / metrics.len().max(1) as f32;

        let id = refs.gen(RefType::FontDescriptor(font_index));
        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(name.as_bytes()));
        descriptor.family(Str(family.as_bytes()));
        descriptor.weight(face.weight().to_number());

        let mut flags = FontFlags::NON_SYMBOLIC;
        if face.is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if face.is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        descriptor.flags(flags);

        let bbox = face.global_bounding_box();
        descriptor.bbox(pdf_writer::Rect {
            x1: bbox.x_min as f32 * scaling,
            y1: bbox.y_min as f32 * scaling,
            x2: bbox.x_max as f32 * scaling,
            y2: (bbox.y_max as f32).max(max_height as f32) * scaling,
        });
        descriptor.italic_angle(face.italic_angle());
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        descriptor.cap_height(
            face.capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(1000.0),
        );
        descriptor.x_height(
            face.x_height()
                .unwrap_or_else(|| face.capital_height().unwrap_or_default()) as f32
                * scaling,
        );
        // TODO: derive from the OS/2 weight class instead of a fixed guess
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);
        descriptor.font_file2(font_data_id);

        Ok(id)
    }

    fn write_to_unicode(
        &self,
        refs: &mut ObjectReferences,
        font_index: usize,
        writer: &mut Pdf,
    ) -> Ref {
        let id = refs.gen(RefType::ToUnicode(font_index));

        let mut map = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo\n\
             << /Registry (Adobe)\n\
             /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        // bfchar blocks hold at most 100 entries that share a high byte
        let glyphs: Vec<(u16, char)> = self.cmap_glyphs().into_iter().collect();
        for block in glyphs.chunk_by(|a, b| a.0 >> 8 == b.0 >> 8) {
            for chunk in block.chunks(100) {
                map.push_str(&format!("{} beginbfchar\n", chunk.len()));
                for (gid, ch) in chunk {
                    let mut utf16 = [0u16; 2];
                    let hex: String = ch
                        .encode_utf16(&mut utf16)
                        .iter()
                        .map(|unit| format!("{unit:04x}"))
                        .collect();
                    map.push_str(&format!("<{gid:04x}> <{hex}>\n"));
                }
                map.push_str("endbfchar\n");
            }
        }

        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        writer
            .stream(id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        id
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn u16s(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    /// A minimal TrueType font with metrics, a cmap and names but no outlines. 1000 units per
    /// em; `.notdef` is 500 wide, `A` 600, U+FFFD 1000 and space 250.
    pub(crate) fn tiny_font() -> Vec<u8> {
        let head = [
            u16s(&[1, 0, 1, 0, 0, 0, 0x5f0f, 0x3cf5, 0, 1000]),
            vec![0; 16],
            u16s(&[0, -200i16 as u16, 1000, 800, 0, 3, 2, 0, 0]),
        ]
        .concat();
        let hhea = u16s(&[
            1, 0, 800, -200i16 as u16, 0, 1000, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 4,
        ]);
        let maxp = u16s(&[0, 0x5000, 4]);
        let hmtx = u16s(&[500, 0, 600, 0, 1000, 0, 250, 0]);
        // one format 12 subtable: ' ' -> 3, 'A' -> 1, U+FFFD -> 2
        let cmap = u16s(&[
            0, 1, 3, 10, 0, 12, //
            12, 0, 0, 52, 0, 0, 0, 3, //
            0, 0x20, 0, 0x20, 0, 3, //
            0, 0x41, 0, 0x41, 0, 1, //
            0, 0xfffd, 0, 0xfffd, 0, 2,
        ]);

        let names = [(1u16, "Tiny"), (4, "Tiny Regular"), (6, "Tiny-Regular")];
        let mut records = u16s(&[0, names.len() as u16, 6 + 12 * names.len() as u16]);
        let mut strings = Vec::new();
        for (id, text) in names {
            let encoded: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
            records.extend(u16s(&[3, 1, 0x409, id, encoded.len() as u16, strings.len() as u16]));
            strings.extend(encoded);
        }
        let name = [records, strings].concat();

        // table records are binary searched, so they have to stay sorted by tag
        let tables: [(&[u8; 4], Vec<u8>); 6] = [
            (b"cmap", cmap),
            (b"head", head),
            (b"hhea", hhea),
            (b"hmtx", hmtx),
            (b"maxp", maxp),
            (b"name", name),
        ];
        let mut font = u16s(&[1, 0, tables.len() as u16, 0, 0, 0]);
        let mut offset = 12 + 16 * tables.len();
        let mut data = Vec::new();
        for (tag, table) in tables {
            font.extend_from_slice(tag);
            font.extend(u16s(&[0, 0]));
            font.extend((offset as u32).to_be_bytes());
            font.extend((table.len() as u32).to_be_bytes());
            let mut padded = table;
            padded.resize(padded.len().next_multiple_of(4), 0);
            offset += padded.len();
            data.extend(padded);
        }
        font.extend(data);
        font
    }

    #[test]
    fn helvetica_widths_match_afm() {
        let regular = Font::builtin(BuiltinFont::Helvetica);
        // H = 722, i = 222
        assert_eq!(regular.width_of("Hi", Pt(1000.0)), Pt(944.0));
        let bold = Font::builtin(BuiltinFont::HelveticaBold);
        // H = 722, i = 278
        assert_eq!(bold.width_of("Hi", Pt(1000.0)), Pt(1000.0));
    }

    #[test]
    fn width_scales_with_size() {
        let font = Font::builtin(BuiltinFont::Helvetica);
        let w12 = font.width_of("definition", Pt(12.0));
        let w24 = font.width_of("definition", Pt(24.0));
        assert!((w24.0 - 2.0 * w12.0).abs() < 1e-3);
        assert_eq!(font.width_of("", Pt(12.0)), Pt(0.0));
    }

    #[test]
    fn builtin_encoding_escapes_and_substitutes() {
        let font = Font::builtin(BuiltinFont::Helvetica);
        let mut out = Vec::new();
        font.encode("a(b)\\c", &mut out).unwrap();
        assert_eq!(out, b"(a\\(b\\)\\\\c)");

        let mut out = Vec::new();
        font.encode("caf\u{e9} \u{4e2d}", &mut out).unwrap();
        assert_eq!(out, b"(caf\\351 ?)");
    }

    #[test]
    fn curly_quotes_have_winansi_codes() {
        assert_eq!(winansi_byte('’'), Some(0x92));
        assert_eq!(winansi_byte('—'), Some(0x97));
        assert_eq!(winansi_byte('\u{4e2d}'), None);
        assert_eq!(BuiltinFont::Helvetica.advance('—'), 1000);
    }

    #[test]
    fn unparseable_font_is_an_error() {
        assert!(matches!(
            Font::load(vec![0, 1, 2, 3]),
            Err(FlashcardError::FaceParsingError(_))
        ));
    }

    #[test]
    fn embedded_widths_match_the_drawn_glyphs() {
        let font = Font::load(tiny_font()).unwrap();
        assert_eq!(font.width_of("A A", Pt(1000.0)), Pt(1450.0));

        // none of these are in the font, so each is drawn as U+FFFD
        let mut out = Vec::new();
        font.encode("\u{4e2d}\u{6587}A", &mut out).unwrap();
        assert_eq!(out, b"<000200020001>");
        let width = font.width_of("\u{4e2d}\u{6587}A", Pt(12.0));
        assert!((width.0 - 31.2).abs() < 1e-3, "{width:?}");
    }

    #[test]
    fn newlines_are_neither_drawn_nor_measured() {
        let font = Font::load(tiny_font()).unwrap();
        let mut out = Vec::new();
        font.encode("A\nA", &mut out).unwrap();
        assert_eq!(out, b"<00010001>");
        assert_eq!(font.width_of("A\nA", Pt(10.0)), font.width_of("AA", Pt(10.0)));

        let builtin = Font::builtin(BuiltinFont::Helvetica);
        let mut out = Vec::new();
        builtin.encode("a\nb", &mut out).unwrap();
        assert_eq!(out, b"(ab)");
    }

    #[test]
    fn embedded_font_is_written_as_a_cid_font() {
        let font = Font::load(tiny_font()).unwrap();
        let mut fonts: id_arena::Arena<Font> = id_arena::Arena::new();
        let id = fonts.alloc(font);

        let mut refs = ObjectReferences::new();
        let mut writer = Pdf::new();
        fonts[id].write(&mut refs, id, &mut writer).unwrap();
        let pdf = String::from_utf8_lossy(&writer.finish()).into_owned();

        assert!(pdf.contains("/Subtype /Type0"));
        assert!(pdf.contains("/Encoding /Identity-H"));
        assert!(pdf.contains("/Subtype /CIDFontType2"));
        assert!(pdf.contains("/FontName /Tiny-Regular"));
        assert!(pdf.contains("/FontFile2"));
        assert!(pdf.contains("/ToUnicode"));
        assert!(refs.get(RefType::FontDescriptor(id.index())).is_some());
    }
}
