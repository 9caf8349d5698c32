//! Text measurement and wrapping.
//!
//! [`wrap_text`](crate::layout::wrap_text) breaks a string into lines that fit a width,
//! measuring with anything that implements [`TextMeasure`](crate::layout::TextMeasure):
//! either the built-in Helvetica metrics ([`StandardMetrics`](crate::layout::StandardMetrics))
//! or the fonts registered with a [`PdfSink`](crate::sink::PdfSink).

mod text;

pub use text::*;
