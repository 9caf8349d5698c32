//! Converts a page's high-level contents into a PDF content stream.

use crate::colour::Colour;
use crate::font::Font;
use crate::page::{PageContents, SpanFont, SpanLayout, StrokeLayout};
use id_arena::Arena;
use std::io::Write;

/// Graphics state that persists between content items, so that redundant operators
/// can be skipped
#[derive(Default)]
struct State {
    font: Option<SpanFont>,
    fill: Option<Colour>,
}

/// Renders page contents to an (uncompressed) PDF content stream.
#[allow(clippy::write_with_newline)]
pub(crate) fn render_contents(
    contents: &[PageContents],
    fonts: &Arena<Font>,
) -> Result<Vec<u8>, std::io::Error> {
    let mut content: Vec<u8> = Vec::default();
    let mut state = State::default();

    for page_content in contents.iter() {
        match page_content {
            PageContents::Text(span) => render_span(&mut content, &mut state, span, fonts)?,
            PageContents::Stroke(stroke) => render_stroke(&mut content, stroke)?,
        }
    }

    Ok(content)
}

#[allow(clippy::write_with_newline)]
fn render_span(
    content: &mut Vec<u8>,
    state: &mut State,
    span: &SpanLayout,
    fonts: &Arena<Font>,
) -> Result<(), std::io::Error> {
    let Some(font) = fonts.get(span.font.id) else {
        return Ok(());
    };

    if state.font != Some(span.font) {
        write!(content, "/F{} {} Tf\n", span.font.id.index(), span.font.size.0)?;
        state.font = Some(span.font);
    }
    if state.fill != Some(span.colour) {
        write_fill_colour(content, span.colour)?;
        state.fill = Some(span.colour);
    }

    write!(content, "BT\n")?;
    write!(content, "{} {} Td\n", span.coords.0 .0, span.coords.1 .0)?;
    font.encode(&span.text, content)?;
    write!(content, " Tj\n")?;
    write!(content, "ET\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn render_stroke(content: &mut Vec<u8>, stroke: &StrokeLayout) -> Result<(), std::io::Error> {
    let rect = stroke.rect;
    write!(content, "q\n")?;
    write_stroke_colour(content, stroke.colour)?;
    write!(content, "{} w\n", stroke.line_width.0)?;
    write!(
        content,
        "{} {} {} {} re\n",
        rect.x1.0,
        rect.y1.0,
        rect.width().0,
        rect.height().0
    )?;
    write!(content, "S\n")?;
    write!(content, "Q\n")?;
    Ok(())
}

#[allow(clippy::write_with_newline)]
fn write_fill_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    write!(content, "{} g\n", colour.grey)
}

#[allow(clippy::write_with_newline)]
fn write_stroke_colour(content: &mut Vec<u8>, colour: Colour) -> Result<(), std::io::Error> {
    write!(content, "{} G\n", colour.grey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colours::BLACK;
    use crate::font::BuiltinFont;
    use crate::rect::Rect;
    use crate::Pt;

    #[test]
    fn spans_share_font_and_colour_operators() {
        let mut fonts = Arena::new();
        let id = fonts.alloc(Font::builtin(BuiltinFont::Helvetica));
        let font = SpanFont { id, size: Pt(12.0) };
        let span = |text: &str, y: f32| {
            PageContents::Text(SpanLayout {
                text: text.to_string(),
                font,
                colour: BLACK,
                coords: (Pt(40.0), Pt(y)),
            })
        };

        let rendered = render_contents(&[span("one", 700.0), span("two", 685.0)], &fonts).unwrap();
        let rendered = String::from_utf8(rendered).unwrap();
        assert_eq!(rendered.matches("Tf").count(), 1);
        assert_eq!(rendered.matches(" g\n").count(), 1);
        assert!(rendered.contains("40 700 Td\n(one) Tj\n"));
        assert!(rendered.contains("40 685 Td\n(two) Tj\n"));
    }

    #[test]
    fn strokes_are_isolated_rectangles() {
        let fonts = Arena::new();
        let stroke = PageContents::Stroke(StrokeLayout {
            rect: Rect::from_origin_size(Pt(30.0), Pt(564.0), Pt(266.0), Pt(178.0)),
            colour: BLACK,
            line_width: Pt(1.0),
        });
        let rendered = String::from_utf8(render_contents(&[stroke], &fonts).unwrap()).unwrap();
        assert_eq!(rendered, "q\n0 G\n1 w\n30 564 266 178 re\nS\nQ\n");
    }
}
