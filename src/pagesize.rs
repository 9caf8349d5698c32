//! Pre-defined page sizes for the paper formats flashcards are usually printed on.
//!
//! All sizes are provided in portrait orientation (width, height) where width ≤ height.
//!
//! ```
//! use flashcard_gen::pagesize::{self, LETTER};
//!
//! assert_eq!(pagesize::by_name("Letter"), Some(LETTER));
//! ```

use crate::units::*;

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

pub const LETTER: PageSize = (Pt(8.5 * 72.0), Pt(11.0 * 72.0));
pub const LEGAL: PageSize = (Pt(8.5 * 72.0), Pt(14.0 * 72.0));

// iso a-series (converted from mm to points)
pub const A4: PageSize = (Pt(210.0 * 72.0 / 25.4), Pt(297.0 * 72.0 / 25.4));
pub const A5: PageSize = (Pt(148.0 * 72.0 / 25.4), Pt(210.0 * 72.0 / 25.4));

/// Look up a page size by its (case-insensitive) name
pub fn by_name(name: &str) -> Option<PageSize> {
    match name.trim().to_ascii_lowercase().as_str() {
        "letter" => Some(LETTER),
        "legal" => Some(LEGAL),
        "a4" => Some(A4),
        "a5" => Some(A5),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve() {
        assert_eq!(by_name("letter"), Some(LETTER));
        assert_eq!(by_name(" A4 "), Some(A4));
        assert_eq!(by_name("tabloid"), None);
    }

    #[test]
    fn letter_is_us_letter() {
        assert_eq!(LETTER, (Pt(612.0), Pt(792.0)));
    }
}
