use crate::definitions::{parse_base_url, DEFAULT_DICTIONARY_URL};
use crate::pagesize::{self, PageSize};
use crate::FlashcardError;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for a run of the generator, loaded from environment variables (and a `.env`
/// file, if there is one). Every setting has a default.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `FLASHCARDS_INPUT`: the word list
    pub input: PathBuf,
    /// `FLASHCARDS_OUTPUT`: where the PDF is written
    pub output: PathBuf,
    /// `DICTIONARY_URL`: the lookup endpoint that words are appended to
    pub dictionary_url: String,
    /// `FLASHCARDS_PAGE_SIZE`: letter, legal, a4 or a5
    pub page_size: PageSize,
    /// `FLASHCARDS_FONT_REGULAR`: a TTF/OTF to embed instead of Helvetica
    pub regular_font: Option<PathBuf>,
    /// `FLASHCARDS_FONT_BOLD`: a TTF/OTF to embed instead of Helvetica-Bold
    pub bold_font: Option<PathBuf>,
    /// `FLASHCARDS_TIMEOUT_SECS`: per-lookup timeout
    pub timeout: Option<Duration>,
    /// `RUST_LOG`: log level used when no filter directives are set
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input: PathBuf::from("words.txt"),
            output: PathBuf::from("flashcards.pdf"),
            dictionary_url: DEFAULT_DICTIONARY_URL.to_string(),
            page_size: pagesize::LETTER,
            regular_font: None,
            bold_font: None,
            timeout: None,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the environment. Keys with unusable values take
    /// their default; what was wrong with each is returned alongside the config.
    pub fn from_env() -> (Self, Vec<anyhow::Error>) {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset or blank keys take the default,
    /// as do keys whose values don't parse
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> (Self, Vec<anyhow::Error>) {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Config::default();
        let mut problems = Vec::new();

        let page_size = var("FLASHCARDS_PAGE_SIZE")
            .map(|name| {
                pagesize::by_name(&name)
                    .ok_or(FlashcardError::UnknownPageSize(name))
                    .context("FLASHCARDS_PAGE_SIZE must be one of letter, legal, a4, a5")
            })
            .and_then(|parsed| keep(parsed, &mut problems))
            .unwrap_or(defaults.page_size);

        let timeout = var("FLASHCARDS_TIMEOUT_SECS")
            .map(|secs| {
                secs.trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .context("FLASHCARDS_TIMEOUT_SECS must be a whole number of seconds")
            })
            .and_then(|parsed| keep(parsed, &mut problems))
            .or(defaults.timeout);

        let dictionary_url = var("DICTIONARY_URL")
            .map(|url| {
                parse_base_url(&url)
                    .map(|_| url)
                    .context("DICTIONARY_URL must be an http(s) url")
            })
            .and_then(|parsed| keep(parsed, &mut problems))
            .unwrap_or(defaults.dictionary_url);

        let config = Config {
            input: var("FLASHCARDS_INPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.input),
            output: var("FLASHCARDS_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output),
            dictionary_url,
            page_size,
            regular_font: var("FLASHCARDS_FONT_REGULAR").map(PathBuf::from),
            bold_font: var("FLASHCARDS_FONT_BOLD").map(PathBuf::from),
            timeout,
            rust_log: var("RUST_LOG").unwrap_or(defaults.rust_log),
        };
        (config, problems)
    }
}

fn keep<T>(parsed: Result<T>, problems: &mut Vec<anyhow::Error>) -> Option<T> {
    parsed.map_err(|e| problems.push(e)).ok()
}
