//! Rendering components
//!
//! Shader program management and bitmap text rendering. Both components
//! assume exclusive single-threaded access to the GL context passed into
//! every call.

pub mod shader;
pub mod text;

pub use shader::{ShaderError, ShaderProgram, ShaderResult, ShaderSource, ShaderStage};
pub use text::{Glyph, GlyphTable, TextError, TextRenderer, TextResult, GLYPH_TABLE_SIZE};
