use crate::colour::Colour;
use crate::content::render_contents;
use crate::font::Font;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use crate::FlashcardError;
use id_arena::{Arena, Id};
use pdf_writer::{Filter, Finish, Name, Pdf};

/// The font (and size) a span of text is set in
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A single run of text, drawn on one line starting at `coords` (the baseline origin)
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

/// The outline of a rectangle
#[derive(Clone, PartialEq, Debug)]
pub struct StrokeLayout {
    pub rect: Rect,
    pub colour: Colour,
    pub line_width: Pt,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(SpanLayout),
    Stroke(StrokeLayout),
}

pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Everything drawn on the page, in painting order
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: PageSize) -> Page {
        let (width, height) = size;
        Page {
            media_box: Rect::from_origin_size(Pt(0.0), Pt(0.0), width, height),
            contents: Vec::default(),
        }
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageContents::Text(span));
    }

    pub fn add_stroke(&mut self, stroke: StrokeLayout) {
        self.contents.push(PageContents::Stroke(stroke));
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &Arena<Font>,
        writer: &mut Pdf,
    ) -> Result<(), FlashcardError> {
        let id = refs
            .get(RefType::Page(page_index))
            .ok_or(FlashcardError::PageMissing)?;
        let content_id = refs.gen(RefType::ContentForPage(page_index));
        let page_tree_id = refs.get(RefType::PageTree).ok_or(FlashcardError::PageMissing)?;

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.parent(page_tree_id);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (font_id, _) in fonts.iter() {
            if let Some(font_ref) = refs.get(RefType::Font(font_id.index())) {
                resource_fonts.pair(Name(format!("F{}", font_id.index()).as_bytes()), font_ref);
            }
        }
        resource_fonts.finish();
        resources.finish();

        page.contents(content_id);
        page.finish();

        let rendered = render_contents(&self.contents, fonts)?;
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            rendered.as_slice(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        writer
            .stream(content_id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours::BLACK;
    use crate::pagesize::{A4, LETTER};

    #[test]
    fn media_box_covers_the_page() {
        let page = Page::new(LETTER);
        assert_eq!(page.media_box, Rect::from_origin_size(Pt(0.0), Pt(0.0), Pt(612.0), Pt(792.0)));
        assert!(page.contents.is_empty());
        assert_eq!(Page::new(A4).media_box.height(), A4.1);
    }

    #[test]
    fn contents_keep_painting_order() {
        let mut page = Page::new(LETTER);
        let card = Rect::from_origin_size(Pt(30.0), Pt(564.0), Pt(266.0), Pt(178.0));
        page.add_stroke(StrokeLayout {
            rect: card,
            colour: BLACK,
            line_width: Pt(1.0),
        });
        let mut fonts: Arena<Font> = Arena::new();
        let id = fonts.alloc(Font::builtin(crate::font::BuiltinFont::HelveticaBold));
        page.add_span(SpanLayout {
            text: "apple".to_string(),
            font: SpanFont { id, size: Pt(16.0) },
            colour: BLACK,
            coords: (Pt(40.0), Pt(712.0)),
        });
        assert!(matches!(page.contents[0], PageContents::Stroke(_)));
        assert!(matches!(page.contents[1], PageContents::Text(_)));
    }
}
