//! Bitmap text rendering
//!
//! Glyph rasterization and caching, plus quad-per-glyph text drawing.

pub mod glyph_table;
pub mod text_renderer;

pub use glyph_table::*;
pub use text_renderer::*;
