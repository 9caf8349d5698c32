//! Lays flashcards out in a two column grid: each word goes in a box on the left with its
//! definition in a box beside it, four rows to a letter page.
//!
//! ```
//! use flashcard_gen::flashcards::{Flashcard, FlashcardLayout};
//! use flashcard_gen::pagesize::LETTER;
//! use flashcard_gen::sink::RecordingSink;
//!
//! let cards = vec![Flashcard::new("cat", "a small domesticated carnivorous mammal")];
//! let mut sink = RecordingSink::new(LETTER);
//! let summary = FlashcardLayout::default()
//!     .layout(&Flashcard::items(cards), &mut sink)
//!     .unwrap();
//! assert_eq!(summary.boxes, 2);
//! assert_eq!(sink.pages_started(), 1);
//! ```

use crate::layout::{wrap_text, FontSpec};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::sink::OutputSink;
use crate::units::Pt;
use tracing::{debug, trace};

/// A word resolved to its definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub word: String,
    pub definition: String,
}

impl Flashcard {
    pub fn new<W: ToString, D: ToString>(word: W, definition: D) -> Flashcard {
        Flashcard {
            word: word.to_string(),
            definition: definition.to_string(),
        }
    }

    /// Flatten cards into the (front, back) item sequence the layout engine consumes
    pub fn items<I: IntoIterator<Item = Flashcard>>(cards: I) -> Vec<FlashcardItem> {
        cards
            .into_iter()
            .flat_map(|card| {
                [
                    FlashcardItem::Front(card.word),
                    FlashcardItem::Back(card.definition),
                ]
            })
            .collect()
    }
}

/// One box's worth of text. Fronts are set in the left column, backs in the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashcardItem {
    /// The word
    Front(String),
    /// The word's definition
    Back(String),
}

/// The tunable constants of the layout, in points
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSettings {
    /// x-origin of the left column
    pub left_margin: Pt,
    /// Distance from the top of the page to the top of the first row
    pub top_margin: Pt,
    /// A row whose top would start below this height goes on a new page instead
    pub bottom_threshold: Pt,
    /// Card width is half the page width less this
    pub card_width_inset: Pt,
    /// Card height is a quarter of the page height less this
    pub card_height_inset: Pt,
    pub column_gap: Pt,
    pub row_gap: Pt,
    /// Horizontal offset of text from the left edge of its box
    pub text_inset: Pt,
    /// Distance from the top of a box down to the first baseline
    pub first_baseline: Pt,
    pub line_spacing: Pt,
    /// Definition lines are wrapped to the card width less this
    pub wrap_inset: Pt,
    /// No definition line is started below the bottom of its box plus this
    pub bottom_padding: Pt,
    /// The font selected whenever a page is started
    pub page_font: FontSpec,
    pub word_font: FontSpec,
    pub definition_font: FontSpec,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            left_margin: Pt(30.0),
            top_margin: Pt(50.0),
            bottom_threshold: Pt(50.0),
            card_width_inset: Pt(40.0),
            card_height_inset: Pt(20.0),
            column_gap: Pt(40.0),
            row_gap: Pt(20.0),
            text_inset: Pt(10.0),
            first_baseline: Pt(30.0),
            line_spacing: Pt(15.0),
            wrap_inset: Pt(20.0),
            bottom_padding: Pt(20.0),
            page_font: FontSpec::bold(14.0),
            word_font: FontSpec::bold(16.0),
            definition_font: FontSpec::regular(12.0),
        }
    }
}

/// Fixed dimensions of one document, derived once from the page size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: Pt,
    pub page_height: Pt,
    pub card_width: Pt,
    pub card_height: Pt,
    pub left: Pt,
    /// y-origin (top edge) of the first row on each page
    pub top: Pt,
    pub bottom_threshold: Pt,
    pub column_gap: Pt,
    pub row_gap: Pt,
}

impl PageGeometry {
    pub fn new(page_size: PageSize, settings: &LayoutSettings) -> PageGeometry {
        let (page_width, page_height) = page_size;
        PageGeometry {
            page_width,
            page_height,
            card_width: page_width / 2.0 - settings.card_width_inset,
            card_height: page_height / 4.0 - settings.card_height_inset,
            left: settings.left_margin,
            top: page_height - settings.top_margin,
            bottom_threshold: settings.bottom_threshold,
            column_gap: settings.column_gap,
            row_gap: settings.row_gap,
        }
    }

    /// The box whose top-left corner is at (x, y)
    pub fn card_at(&self, x: Pt, y: Pt) -> Rect {
        Rect::from_origin_size(x, y - self.card_height, self.card_width, self.card_height)
    }

    /// How many rows (word/definition pairs) fit on a page before it overflows
    pub fn rows_per_page(&self) -> usize {
        let pitch = self.card_height + self.row_gap;
        if pitch.0 <= 0.0 || self.top < self.bottom_threshold {
            return 1;
        }
        ((self.top - self.bottom_threshold).0 / pitch.0).floor() as usize + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Left,
    Right,
}

/// Where the next box goes: the top-left corner of the box and which column that is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub x: Pt,
    pub y: Pt,
    column: Column,
}

impl LayoutCursor {
    fn new(geometry: &PageGeometry) -> LayoutCursor {
        LayoutCursor {
            x: geometry.left,
            y: geometry.top,
            column: Column::Left,
        }
    }

    fn next_column(&mut self, geometry: &PageGeometry) {
        self.x += geometry.card_width + geometry.column_gap;
        self.column = Column::Right;
    }

    fn next_row(&mut self, geometry: &PageGeometry) {
        self.y -= geometry.card_height + geometry.row_gap;
        self.x = geometry.left;
        self.column = Column::Left;
    }

    fn overflows(&self, geometry: &PageGeometry) -> bool {
        self.y < geometry.bottom_threshold
    }

    fn top_of_page(&mut self, geometry: &PageGeometry) {
        self.y = geometry.top;
    }
}

/// Font state threaded through the layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingState {
    pub font: FontSpec,
}

/// What a call to [FlashcardLayout::layout] produced
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSummary {
    /// Boxes drawn; one per item
    pub boxes: usize,
    pub pages: usize,
    /// Definition lines drawn
    pub lines: usize,
    /// Definition lines that didn't fit in their box
    pub truncated_lines: usize,
    /// Definitions that lost at least one line
    pub truncated_definitions: usize,
}

/// The flashcard layout engine. Each call to [FlashcardLayout::layout] lays out one
/// complete document.
#[derive(Debug, Clone, Default)]
pub struct FlashcardLayout {
    settings: LayoutSettings,
}

impl FlashcardLayout {
    pub fn new(settings: LayoutSettings) -> FlashcardLayout {
        FlashcardLayout { settings }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Place every item in its own box, starting new pages as needed, then finish the sink.
    ///
    /// Fronts go in the left column and backs in the right, so a well formed
    /// `[Front, Back, Front, Back, ..]` sequence puts each word beside its definition. A
    /// front that follows another front ends the row early, and a back with no front before
    /// it leaves the left box of its row empty.
    ///
    /// Definitions that don't fit in their box are cut off after the last line that does.
    ///
    /// An empty `items` draws nothing: no page is started and the sink isn't finished.
    pub fn layout<S: OutputSink>(
        &self,
        items: &[FlashcardItem],
        sink: &mut S,
    ) -> Result<LayoutSummary, S::Error> {
        let mut summary = LayoutSummary::default();
        if items.is_empty() {
            debug!("no flashcard items, nothing to lay out");
            return Ok(summary);
        }

        let geometry = PageGeometry::new(sink.page_size(), &self.settings);
        let mut cursor = LayoutCursor::new(&geometry);
        let mut state = DrawingState {
            font: self.settings.page_font,
        };
        debug!(
            card_width = geometry.card_width.0,
            card_height = geometry.card_height.0,
            rows_per_page = geometry.rows_per_page(),
            "laying out {} flashcard items",
            items.len()
        );

        sink.start_page();
        summary.pages = 1;

        for item in items {
            trace!(?item, font = ?state.font, "placing");

            match (item, cursor.column) {
                (FlashcardItem::Front(_), Column::Right) => cursor.next_row(&geometry),
                (FlashcardItem::Back(_), Column::Left) => cursor.next_column(&geometry),
                _ => {}
            }

            if cursor.overflows(&geometry) {
                sink.start_page();
                summary.pages += 1;
                cursor.top_of_page(&geometry);
                state.font = self.settings.page_font;
            }

            sink.stroke_rect(geometry.card_at(cursor.x, cursor.y));
            summary.boxes += 1;

            match item {
                FlashcardItem::Front(word) => {
                    state.font = self.settings.word_font;
                    sink.draw_text(word, state.font, self.text_origin(&cursor));
                    cursor.next_column(&geometry);
                }
                FlashcardItem::Back(definition) => {
                    state.font = self.settings.definition_font;
                    self.draw_definition(definition, &state, &cursor, &geometry, sink, &mut summary);
                    cursor.next_row(&geometry);
                }
            }
        }

        sink.finish()?;
        debug!(?summary, "flashcard layout finished");
        Ok(summary)
    }

    fn text_origin(&self, cursor: &LayoutCursor) -> (Pt, Pt) {
        (
            cursor.x + self.settings.text_inset,
            cursor.y - self.settings.first_baseline,
        )
    }

    fn draw_definition<S: OutputSink>(
        &self,
        definition: &str,
        state: &DrawingState,
        cursor: &LayoutCursor,
        geometry: &PageGeometry,
        sink: &mut S,
        summary: &mut LayoutSummary,
    ) {
        let max_width = geometry.card_width - self.settings.wrap_inset;
        let lines = wrap_text(definition, state.font, max_width, &*sink);
        let floor = cursor.y - geometry.card_height + self.settings.bottom_padding;

        let (x, mut y) = self.text_origin(cursor);
        for (i, line) in lines.iter().enumerate() {
            if y < floor {
                let dropped = lines.len() - i;
                debug!(dropped, "definition truncated to fit its card");
                summary.truncated_lines += dropped;
                summary.truncated_definitions += 1;
                break;
            }
            sink.draw_text(line, state.font, (x, y));
            summary.lines += 1;
            y -= self.settings.line_spacing;
        }
    }
}
