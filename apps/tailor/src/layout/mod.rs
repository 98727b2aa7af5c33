// Document layout: static glyph metrics and the text paginator used for export.
// Pure computation; callers run it on a blocking thread when rendering.

pub mod font_metrics;
pub mod paginator;

pub use font_metrics::FontFamily;
pub use paginator::{paginate, Page, PageGeometry};
