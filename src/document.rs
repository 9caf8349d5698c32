use crate::{
    font::Font,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    FlashcardError,
};
use id_arena::{Arena, Id};
use pdf_writer::{Pdf, Ref};
use std::io::Write;

#[derive(Default)]
/// A document is the main object that stores all the contents of the PDF
/// then renders it out with a call to [Document::write]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
    pub fonts: Arena<Font>,
}

impl Document {
    /// Sets information about the document. If not provided, no information block will be
    /// written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document, returning its id
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    /// The page at the end of the document, if there is one
    pub fn last_page_mut(&mut self) -> Option<&mut Page> {
        let id = *self.page_order.last()?;
        self.pages.get_mut(id)
    }

    /// Add a font to the document. Fonts are stored "globally" within the document, so any
    /// page can refer to the font by the returned id.
    pub fn add_font(&mut self, font: Font) -> Id<Font> {
        self.fonts.alloc(font)
    }

    /// Write the entire document to the writer. The whole document is rendered in memory
    /// first, so this allocates roughly the size of the output.
    ///
    /// All object references are generated here; until then pages and fonts can be
    /// freely added.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), FlashcardError> {
        let Document {
            info,
            pages,
            page_order,
            fonts,
        } = self;

        let mut refs = ObjectReferences::new();
        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        // page refs are keyed by position in the document, not arena index
        let page_refs: Vec<Ref> = (0..page_order.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (id, font) in fonts.iter() {
            font.write(&mut refs, id, &mut writer)?;
        }

        for (page_index, id) in page_order.iter().enumerate() {
            let page = pages.get(*id).ok_or(FlashcardError::PageMissing)?;
            page.write(&mut refs, page_index, &fonts, &mut writer)?;
        }

        writer.catalog(catalog_id).pages(page_tree_id);

        w.write_all(writer.finish().as_slice()).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours::BLACK;
    use crate::font::BuiltinFont;
    use crate::page::{SpanFont, SpanLayout};
    use crate::pagesize::LETTER;
    use crate::Pt;

    #[test]
    fn writes_a_pdf_with_every_page() {
        let mut doc = Document::default();
        doc.set_info(Info::for_deck(1));
        let font = doc.add_font(Font::builtin(BuiltinFont::HelveticaBold));

        let mut page = Page::new(LETTER);
        page.add_span(SpanLayout {
            text: "apple".to_string(),
            font: SpanFont {
                id: font,
                size: Pt(16.0),
            },
            colour: BLACK,
            coords: (Pt(40.0), Pt(712.0)),
        });
        doc.add_page(page);
        doc.add_page(Page::new(LETTER));
        assert_eq!(doc.page_count(), 2);

        let mut out: Vec<u8> = Vec::new();
        doc.write(&mut out).unwrap();

        assert!(out.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/Encoding /WinAnsiEncoding"));
        assert!(text.contains("/Title (Flashcards)"));
    }

    #[test]
    fn last_page_is_the_most_recently_added() {
        let mut doc = Document::default();
        let font = doc.add_font(Font::builtin(BuiltinFont::Helvetica));
        assert!(doc.last_page_mut().is_none());
        doc.add_page(Page::new(LETTER));
        let id = doc.add_page(Page::new(LETTER));
        doc.last_page_mut().unwrap().add_span(SpanLayout {
            text: "x".into(),
            font: SpanFont {
                id: font,
                size: Pt(12.0),
            },
            colour: BLACK,
            coords: (Pt(0.0), Pt(0.0)),
        });
        assert_eq!(doc.pages[id].contents.len(), 1);
    }
}
