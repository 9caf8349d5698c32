use thiserror::Error;

/// All errors that the crate can generate
#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse a font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    #[error("embedded font has no {0} in its name table")]
    /// An embedded font is missing the naming data needed to describe it in the PDF
    UnnamedFont(&'static str),

    #[error("unknown page size `{0}`")]
    /// A page size name that [crate::pagesize::by_name] doesn't know
    UnknownPageSize(String),

    #[error("page is missing from the document")]
    /// The page order refers to a page that is no longer in the document
    PageMissing,
}
