//! The whole batch: read the word list, look up each definition, lay out the cards, and
//! write the PDF.
//!
//! Generation is best-effort: lookups that fail become [DEFINITION_NOT_FOUND], an
//! unreadable word list counts as an empty one, and an empty word list skips generation.
//! Only failing to produce the PDF itself is reported as an error.
//!
//! [DEFINITION_NOT_FOUND]: crate::definitions::DEFINITION_NOT_FOUND

use crate::config::Config;
use crate::definitions::{resolve_all, DefinitionSource};
use crate::flashcards::{Flashcard, FlashcardLayout, LayoutSummary};
use crate::font::Font;
use crate::info::Info;
use crate::sink::{FontPair, PdfSink};
use crate::words::load_words;
use crate::FlashcardError;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// There were no words, so no PDF was written
    NoFlashcards,
    Generated {
        path: PathBuf,
        cards: usize,
        summary: LayoutSummary,
    },
}

/// Load `path` as an embedded font, or fall back to the built-in font
fn load_font(path: Option<&Path>, fallback: Font) -> Result<Font, FlashcardError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "embedding font");
            Font::load(std::fs::read(path)?)
        }
        None => Ok(fallback),
    }
}

/// Fonts for the PDF, as configured
pub fn configured_fonts(config: &Config) -> Result<FontPair, FlashcardError> {
    let defaults = FontPair::default();
    Ok(FontPair {
        regular: load_font(config.regular_font.as_deref(), defaults.regular)?,
        bold: load_font(config.bold_font.as_deref(), defaults.bold)?,
    })
}

/// Run the generator with definitions from `source`
pub fn generate<S: DefinitionSource + ?Sized>(
    config: &Config,
    source: &S,
) -> Result<Outcome, FlashcardError> {
    let words = match load_words(&config.input) {
        Ok(words) => words,
        Err(e) => {
            error!(path = %config.input.display(), "can't read word list: {e}");
            Vec::new()
        }
    };

    if words.is_empty() {
        info!("no words to make flashcards from");
        return Ok(Outcome::NoFlashcards);
    }

    // fonts first, so a bad path fails before any lookups
    let fonts = configured_fonts(config)?;

    info!("looking up {} definitions", words.len());
    let cards = resolve_all(&words, source);
    write_deck(config, cards, fonts)
}

/// Lay out already-resolved cards and write them to `config.output`
pub fn generate_pdf(config: &Config, cards: Vec<Flashcard>) -> Result<Outcome, FlashcardError> {
    if cards.is_empty() {
        return Ok(Outcome::NoFlashcards);
    }
    write_deck(config, cards, configured_fonts(config)?)
}

fn write_deck(
    config: &Config,
    cards: Vec<Flashcard>,
    fonts: FontPair,
) -> Result<Outcome, FlashcardError> {
    let count = cards.len();
    let items = Flashcard::items(cards);
    info!(
        path = %config.output.display(),
        "generating pdf with {} flashcard items",
        items.len()
    );

    let mut sink = PdfSink::new(&config.output, config.page_size, fonts);
    let mut info = Info::for_deck(count);
    if let Some(stem) = config.input.file_stem() {
        info.title(format!("Flashcards: {}", stem.to_string_lossy()));
    }
    sink.set_info(info);

    let summary = FlashcardLayout::default().layout(&items, &mut sink)?;
    if summary.truncated_definitions > 0 {
        info!(
            "{} definitions were too long for their cards and were cut short",
            summary.truncated_definitions
        );
    }

    Ok(Outcome::Generated {
        path: config.output.clone(),
        cards: count,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> Config {
        Config {
            input: dir.join("words.txt"),
            output: dir.join("flashcards.pdf"),
            ..Config::default()
        }
    }

    fn offline(word: &str) -> String {
        format!("the meaning of {word}")
    }

    #[test]
    fn missing_word_list_means_no_flashcards() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let outcome = generate(&config, &offline).unwrap();
        assert_eq!(outcome, Outcome::NoFlashcards);
        assert!(!config.output.exists());
    }

    #[test]
    fn writes_one_box_per_word_and_definition() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(&config.input, "apple\nbanana\ncherry\n").unwrap();

        let outcome = generate(&config, &offline).unwrap();
        let Outcome::Generated { path, cards, summary } = outcome else {
            panic!("expected a pdf");
        };
        assert_eq!(path, config.output);
        assert_eq!(cards, 3);
        assert_eq!(summary.boxes, 6);
        assert_eq!(summary.pages, 1);
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn unreadable_fonts_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            regular_font: Some(dir.path().join("missing.ttf")),
            ..config_in(dir.path())
        };
        assert!(matches!(
            configured_fonts(&config),
            Err(FlashcardError::Io(_))
        ));
    }

    #[test]
    fn fonts_are_loaded_before_any_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            bold_font: Some(dir.path().join("missing-bold.ttf")),
            ..config_in(dir.path())
        };
        std::fs::write(&config.input, "apple\nbanana\n").unwrap();

        let lookups = std::cell::Cell::new(0);
        let counting = |word: &str| {
            lookups.set(lookups.get() + 1);
            offline(word)
        };
        assert!(matches!(
            generate(&config, &counting),
            Err(FlashcardError::Io(_))
        ));
        assert_eq!(lookups.get(), 0);
        assert!(!config.output.exists());
    }
}
