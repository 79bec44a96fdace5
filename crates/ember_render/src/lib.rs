//! # Ember Render
//!
//! A small real-time rendering toolkit on OpenGL: a GLSL shader-program
//! wrapper and a bitmap-text renderer built on `fontdue`.
//!
//! ## Features
//!
//! - **Shader Programs**: Compile and link GLSL vertex/fragment pairs with
//!   typed, name-keyed uniform setters
//! - **Bitmap Text**: Per-character glyph rasterization and caching, drawn
//!   as textured quads through one reusable dynamic buffer
//! - **Recoverable Errors**: Resource-open and compile/link failures surface
//!   as typed `Result`s carrying the full diagnostic payload, so the
//!   embedding application decides whether to terminate
//!
//! The library never owns a GL context or window; every GL-touching call
//! takes a [`glow::Context`] that the embedding application created and made
//! current on the calling thread. GPU resources are released only through
//! explicit `destroy` calls, never on drop, so one handle can be shared
//! across wrappers with manual lifetime control.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ember_render::render::TextRenderer;
//! use nalgebra::Vector3;
//!
//! # fn run(gl: &glow::Context) -> Result<(), Box<dyn std::error::Error>> {
//! let text = TextRenderer::new(gl, "fonts/default.ttf", 48.0, 800, 600)?;
//! text.draw(gl, "Hello", 25.0, 25.0, 1.0, Vector3::new(1.0, 1.0, 1.0));
//! text.destroy(gl);
//! # Ok(())
//! # }
//! ```

pub mod render;

/// Common imports for library users
pub mod prelude {
    pub use crate::render::{
        shader::{ShaderError, ShaderProgram, ShaderSource},
        text::{TextError, TextRenderer},
    };
}
