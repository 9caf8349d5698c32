use crate::font::BuiltinFont;
use crate::units::Pt;

/// The two weights flashcard text is set in
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// A font style at a particular size
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontSpec {
    pub style: FontStyle,
    pub size: Pt,
}

impl FontSpec {
    pub const fn new(style: FontStyle, size: Pt) -> FontSpec {
        FontSpec { style, size }
    }

    pub const fn bold(size: f32) -> FontSpec {
        FontSpec::new(FontStyle::Bold, Pt(size))
    }

    pub const fn regular(size: f32) -> FontSpec {
        FontSpec::new(FontStyle::Regular, Pt(size))
    }
}

/// Anything that knows how wide a string renders in a given font
pub trait TextMeasure {
    fn text_width(&self, text: &str, font: FontSpec) -> Pt;
}

/// Measures text with the metrics of the standard Helvetica / Helvetica-Bold fonts
#[derive(Debug, Default, Copy, Clone)]
pub struct StandardMetrics;

impl StandardMetrics {
    pub fn builtin_for(style: FontStyle) -> BuiltinFont {
        match style {
            FontStyle::Regular => BuiltinFont::Helvetica,
            FontStyle::Bold => BuiltinFont::HelveticaBold,
        }
    }
}

impl TextMeasure for StandardMetrics {
    fn text_width(&self, text: &str, font: FontSpec) -> Pt {
        let builtin = StandardMetrics::builtin_for(font.style);
        let units: u32 = text.chars().map(|ch| builtin.advance(ch) as u32).sum();
        font.size * (units as f32 / 1000.0)
    }
}

/// Greedily wraps `text` into lines no wider than `max_width`.
///
/// Words are the whitespace-separated tokens of `text` and are re-joined with single
/// spaces. A word is added to the current line unless doing so would make the line wider
/// than `max_width`, in which case it starts the next line. A word that is wider than
/// `max_width` on its own still gets a line to itself rather than being split.
///
/// Empty (or whitespace-only) text produces no lines.
///
/// ```
/// use flashcard_gen::layout::{wrap_text, FontSpec, StandardMetrics};
/// use flashcard_gen::Pt;
///
/// let lines = wrap_text("a small domesticated carnivorous mammal", FontSpec::regular(12.0), Pt(120.0), &StandardMetrics);
/// assert_eq!(lines, vec!["a small domesticated", "carnivorous mammal"]);
/// ```
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    font: FontSpec,
    max_width: Pt,
    measure: &M,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let candidate = format!("{line} {word}");
        if measure.text_width(&candidate, font) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
