//! Drawing targets for the flashcard layout engine.
//!
//! The engine only knows about [OutputSink]: start a page, outline a rectangle, draw a
//! string, and finish. [PdfSink] turns those commands into a PDF file on disk, while
//! [RecordingSink] keeps them in memory so that layouts can be inspected.

use crate::colour::{colours, Colour};
use crate::document::Document;
use crate::font::{BuiltinFont, Font};
use crate::info::Info;
use crate::layout::{FontSpec, FontStyle, StandardMetrics, TextMeasure};
use crate::page::{Page, SpanFont, SpanLayout, StrokeLayout};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::units::Pt;
use crate::FlashcardError;
use id_arena::Id;
use std::convert::Infallible;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Something the layout engine can draw on. Every text call carries its own font, so a
/// sink has no "current font" state for callers to keep track of.
pub trait OutputSink: TextMeasure {
    type Error;

    /// The (width, height) of every page in points
    fn page_size(&self) -> PageSize;

    /// Begin a new, empty page. All subsequent drawing lands on it.
    fn start_page(&mut self);

    /// Outline `rect` with a thin black stroke
    fn stroke_rect(&mut self, rect: Rect);

    /// Draw `text` on a single line with its baseline starting at `origin`
    fn draw_text(&mut self, text: &str, font: FontSpec, origin: (Pt, Pt));

    /// Persist everything drawn so far
    fn finish(&mut self) -> Result<(), Self::Error>;
}

/// The regular and bold fonts a [PdfSink] draws with
pub struct FontPair {
    pub regular: Font,
    pub bold: Font,
}

impl Default for FontPair {
    fn default() -> Self {
        FontPair {
            regular: Font::builtin(BuiltinFont::Helvetica),
            bold: Font::builtin(BuiltinFont::HelveticaBold),
        }
    }
}

/// Draws onto a [Document] and writes it to `path` when finished. Nothing touches the
/// file system until [OutputSink::finish] is called.
pub struct PdfSink {
    document: Document,
    page_size: PageSize,
    regular: Id<Font>,
    bold: Id<Font>,
    colour: Colour,
    line_width: Pt,
    path: PathBuf,
}

impl PdfSink {
    pub fn new<P: AsRef<Path>>(path: P, page_size: PageSize, fonts: FontPair) -> PdfSink {
        let mut document = Document::default();
        let regular = document.add_font(fonts.regular);
        let bold = document.add_font(fonts.bold);
        PdfSink {
            document,
            page_size,
            regular,
            bold,
            colour: colours::BLACK,
            line_width: Pt(1.0),
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn set_info(&mut self, info: Info) {
        self.document.set_info(info);
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn font_id(&self, style: FontStyle) -> Id<Font> {
        match style {
            FontStyle::Regular => self.regular,
            FontStyle::Bold => self.bold,
        }
    }

    fn current_page(&mut self) -> &mut Page {
        if self.document.page_count() == 0 {
            self.start_page();
        }
        self.document
            .last_page_mut()
            .expect("a page was just started")
    }
}

impl TextMeasure for PdfSink {
    fn text_width(&self, text: &str, font: FontSpec) -> Pt {
        self.document
            .fonts
            .get(self.font_id(font.style))
            .map(|f| f.width_of(text, font.size))
            .unwrap_or_default()
    }
}

impl OutputSink for PdfSink {
    type Error = FlashcardError;

    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn start_page(&mut self) {
        self.document.add_page(Page::new(self.page_size));
    }

    fn stroke_rect(&mut self, rect: Rect) {
        let stroke = StrokeLayout {
            rect,
            colour: self.colour,
            line_width: self.line_width,
        };
        self.current_page().add_stroke(stroke);
    }

    fn draw_text(&mut self, text: &str, font: FontSpec, origin: (Pt, Pt)) {
        let span = SpanLayout {
            text: text.to_string(),
            font: SpanFont {
                id: self.font_id(font.style),
                size: font.size,
            },
            colour: self.colour,
            coords: origin,
        };
        self.current_page().add_span(span);
    }

    fn finish(&mut self) -> Result<(), FlashcardError> {
        let document = std::mem::take(&mut self.document);
        debug!(
            path = %self.path.display(),
            pages = document.page_count(),
            "writing pdf"
        );
        let file = File::create(&self.path)?;
        document.write(BufWriter::new(file))
    }
}

/// A single call made on a [RecordingSink]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    StartPage,
    StrokeRect(Rect),
    Text {
        text: String,
        font: FontSpec,
        origin: (Pt, Pt),
    },
    Finish,
}

/// Records every drawing command instead of rendering anything. Text is measured with
/// [StandardMetrics], so wrapping matches a [PdfSink] using the default fonts.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    page_size: PageSize,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSink {
    pub fn new(page_size: PageSize) -> RecordingSink {
        RecordingSink {
            page_size,
            commands: Vec::new(),
        }
    }

    pub fn pages_started(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::StartPage))
    }

    pub fn rects(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokeRect(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<(&str, FontSpec, (Pt, Pt))> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, font, origin } => Some((text.as_str(), *font, *origin)),
                _ => None,
            })
            .collect()
    }

    pub fn finished(&self) -> bool {
        self.commands.contains(&DrawCommand::Finish)
    }

    fn count(&self, f: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| f(c)).count()
    }
}

impl TextMeasure for RecordingSink {
    fn text_width(&self, text: &str, font: FontSpec) -> Pt {
        StandardMetrics.text_width(text, font)
    }
}

impl OutputSink for RecordingSink {
    type Error = Infallible;

    fn page_size(&self) -> PageSize {
        self.page_size
    }

    fn start_page(&mut self) {
        self.commands.push(DrawCommand::StartPage);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::StrokeRect(rect));
    }

    fn draw_text(&mut self, text: &str, font: FontSpec, origin: (Pt, Pt)) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            font,
            origin,
        });
    }

    fn finish(&mut self) -> Result<(), Infallible> {
        self.commands.push(DrawCommand::Finish);
        Ok(())
    }
}
