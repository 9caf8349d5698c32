//! Turns a list of words into printable PDF flashcards: each word is looked up in an online
//! dictionary and laid out beside its definition, eight boxes to a page.

mod colour;
pub use colour::*;

pub mod config;

mod content;

pub mod definitions;

mod document;
pub use document::*;

mod error;
pub use error::*;

pub mod flashcards;

mod font;
pub use font::*;

pub mod generator;

mod info;
pub use info::*;

/// Text measurement and wrapping
pub mod layout;

mod page;
pub use page::*;

pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

pub mod sink;

mod units;
pub use units::*;

pub mod words;
