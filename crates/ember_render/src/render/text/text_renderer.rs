//! Bitmap text renderer
//!
//! Rasterizes and caches per-character glyph bitmaps at setup, then renders
//! strings as a sequence of textured quads through one shared dynamic vertex
//! buffer. One draw call per cached character; pen state is local to each
//! `draw` invocation.

use std::io;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use glow::HasContext;
use nalgebra::{Matrix4, Vector2, Vector3};

use super::glyph_table::{Glyph, GlyphTable, GLYPH_TABLE_SIZE};
use crate::render::shader::{ShaderError, ShaderProgram, ShaderSource};

/// Built-in text shader sources, shipped with the crate
const TEXT_VERTEX_SRC: &str = include_str!("../../../shaders/text.vert");
const TEXT_FRAGMENT_SRC: &str = include_str!("../../../shaders/text.frag");

/// Result type for text rendering operations
pub type TextResult<T> = Result<T, TextError>;

/// Errors that can occur while building a text renderer
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The font file could not be opened or read
    #[error("failed to read font file {path}: {source}")]
    FontRead {
        /// Path of the font file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The font data could not be parsed by the rasterizer
    #[error("failed to parse font: {0}")]
    FontParse(String),

    /// The GL driver refused to allocate a texture or buffer object
    #[error("failed to create GL {0} object: {1}")]
    ObjectCreation(&'static str, String),

    /// The built-in text shader failed to build
    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// One quad: 4 vertices in triangle-strip order, each position xy + texcoord uv
type QuadVertices = [[f32; 4]; 4];

/// Renders strings as textured glyph quads.
///
/// Owns the glyph cache, one dynamic vertex buffer rewritten per glyph per
/// draw, and a [`ShaderProgram`] configured with an orthographic projection
/// sized to the viewport. Single-threaded by contract: the GL context passed
/// in must be current on the calling thread, and concurrent `draw` calls are
/// unsupported since they share the one vertex buffer.
pub struct TextRenderer {
    glyphs: GlyphTable,
    vao: glow::NativeVertexArray,
    vbo: glow::NativeBuffer,
    shader: ShaderProgram,
    projection: Matrix4<f32>,
}

impl TextRenderer {
    /// Rasterize and cache glyphs for character codes 0-127 and set up the
    /// GL objects for drawing.
    ///
    /// Reads the font file in full, uploads one single-channel texture per
    /// glyph, builds the built-in text shader, and allocates the reusable
    /// one-quad vertex buffer. The parsed font is dropped before returning;
    /// the cache is self-sufficient. The orthographic projection maps pixel
    /// coordinates with a bottom-left origin to the given viewport.
    pub fn new(
        gl: &glow::Context,
        font_path: impl AsRef<Path>,
        font_size: f32,
        viewport_width: u32,
        viewport_height: u32,
    ) -> TextResult<Self> {
        let font_path = font_path.as_ref();
        let font_data = std::fs::read(font_path).map_err(|source| TextError::FontRead {
            path: font_path.to_path_buf(),
            source,
        })?;
        let font = Font::from_bytes(font_data.as_slice(), FontSettings::default())
            .map_err(|e| TextError::FontParse(e.to_string()))?;

        log::info!(
            "Rasterizing {} glyphs at {}px from {}",
            GLYPH_TABLE_SIZE,
            font_size,
            font_path.display()
        );

        // Glyph bitmaps are single-channel with arbitrary row widths.
        unsafe { gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1) };

        // Construction is all-or-nothing: each bail-out below releases every
        // GL object created so far, since a recovering caller holds no
        // handle it could free.
        let mut glyphs = GlyphTable::new();
        for code in 0..GLYPH_TABLE_SIZE {
            let ch = code as u8 as char;
            let (metrics, bitmap) = font.rasterize(ch, font_size);
            let texture = match upload_glyph_texture(gl, &metrics, &bitmap) {
                Ok(texture) => texture,
                Err(err) => {
                    release_glyph_textures(gl, &glyphs);
                    return Err(err);
                }
            };
            glyphs.insert(
                code,
                Glyph::new(
                    texture,
                    Vector2::new(metrics.width as f32, metrics.height as f32),
                    Vector2::new(metrics.xmin as f32, metrics.ymin as f32),
                    metrics.advance_width,
                ),
            );
        }

        let source = ShaderSource::from_strs(TEXT_VERTEX_SRC, TEXT_FRAGMENT_SRC);
        let shader = match ShaderProgram::new(gl, "text", &source) {
            Ok(shader) => shader,
            Err(err) => {
                release_glyph_textures(gl, &glyphs);
                return Err(err.into());
            }
        };
        let projection = ortho_projection(viewport_width, viewport_height);

        let vao = match unsafe { gl.create_vertex_array() } {
            Ok(vao) => vao,
            Err(reason) => {
                shader.destroy(gl);
                release_glyph_textures(gl, &glyphs);
                return Err(TextError::ObjectCreation("vertex array", reason));
            }
        };
        let vbo = match unsafe { gl.create_buffer() } {
            Ok(vbo) => vbo,
            Err(reason) => {
                unsafe { gl.delete_vertex_array(vao) };
                shader.destroy(gl);
                release_glyph_textures(gl, &glyphs);
                return Err(TextError::ObjectCreation("buffer", reason));
            }
        };

        unsafe {
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            // Sized for exactly one quad, rewritten per glyph per draw.
            gl.buffer_data_size(
                glow::ARRAY_BUFFER,
                std::mem::size_of::<QuadVertices>() as i32,
                glow::DYNAMIC_DRAW,
            );
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(
                0,
                4,
                glow::FLOAT,
                false,
                4 * std::mem::size_of::<f32>() as i32,
                0,
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
        }

        log::info!("Text renderer ready: {} glyphs cached", glyphs.len());

        Ok(Self {
            glyphs,
            vao,
            vbo,
            shader,
            projection,
        })
    }

    /// Draw a line of text with its baseline starting at pixel position
    /// `(x, y)`, bottom-left origin.
    ///
    /// Activates the text shader, uploads the color and projection uniforms,
    /// then issues one draw call per cached character, advancing the pen by
    /// advance x scale. Characters without a cached glyph (codes >= 128) are
    /// skipped. Nothing persists between calls except the glyph cache.
    pub fn draw(
        &self,
        gl: &glow::Context,
        text: &str,
        x: f32,
        y: f32,
        scale: f32,
        color: Vector3<f32>,
    ) {
        self.shader.bind(gl);
        self.shader.set_vec3(gl, "textColor", &color);
        self.shader.set_mat4(gl, "projection", &self.projection);

        unsafe {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_vertex_array(Some(self.vao));
        }

        let mut pen_x = x;
        for ch in text.chars() {
            let glyph = match self.glyphs.get(ch) {
                Some(glyph) => glyph,
                None => {
                    log::trace!("no glyph cached for {:?}, skipping", ch);
                    continue;
                }
            };

            let quad = glyph_quad(pen_x, y, scale, glyph);
            unsafe {
                gl.bind_texture(glow::TEXTURE_2D, Some(glyph.texture));
                gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
                gl.buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, 0, bytemuck::cast_slice(&quad));
                gl.bind_buffer(glow::ARRAY_BUFFER, None);
                gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
            }

            pen_x += glyph.advance * scale;
        }

        unsafe {
            gl.bind_vertex_array(None);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    /// Measure the horizontal advance of a string at the given scale.
    ///
    /// Uses the same skip policy as [`draw`], so the result matches what a
    /// draw call would cover. Useful for centering and right-alignment.
    ///
    /// [`draw`]: TextRenderer::draw
    pub fn line_width(&self, text: &str, scale: f32) -> f32 {
        self.glyphs.line_width(text, scale)
    }

    /// Access the cached glyph table
    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    /// Release every GPU resource owned by this renderer: glyph textures,
    /// the vertex buffer and array, and the text shader.
    ///
    /// Call at most once. Drop never releases GPU state.
    pub fn destroy(&self, gl: &glow::Context) {
        release_glyph_textures(gl, &self.glyphs);
        unsafe {
            gl.delete_buffer(self.vbo);
            gl.delete_vertex_array(self.vao);
        }
        self.shader.destroy(gl);
    }
}

fn release_glyph_textures(gl: &glow::Context, glyphs: &GlyphTable) {
    for glyph in glyphs.iter() {
        unsafe { gl.delete_texture(glyph.texture) };
    }
}

fn upload_glyph_texture(
    gl: &glow::Context,
    metrics: &fontdue::Metrics,
    bitmap: &[u8],
) -> TextResult<glow::NativeTexture> {
    let texture =
        unsafe { gl.create_texture() }.map_err(|e| TextError::ObjectCreation("texture", e))?;

    unsafe {
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::R8 as i32,
            metrics.width as i32,
            metrics.height as i32,
            0,
            glow::RED,
            glow::UNSIGNED_BYTE,
            Some(bitmap),
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.bind_texture(glow::TEXTURE_2D, None);
    }

    Ok(texture)
}

/// Orthographic projection mapping pixel coordinates (bottom-left origin)
/// to normalized device space.
fn ortho_projection(width: u32, height: u32) -> Matrix4<f32> {
    Matrix4::new_orthographic(0.0, width as f32, 0.0, height as f32, -1.0, 1.0)
}

/// Build the screen-space quad for one glyph at the given pen position.
///
/// Triangle-strip order: top-left, bottom-left, top-right, bottom-right.
/// Bitmap row 0 is the top of the glyph, so v = 0 maps to the top edge.
fn glyph_quad(pen_x: f32, baseline_y: f32, scale: f32, glyph: &Glyph) -> QuadVertices {
    let x_min = pen_x + glyph.bearing.x * scale;
    let y_min = baseline_y + glyph.bearing.y * scale;
    let x_max = x_min + glyph.size.x * scale;
    let y_max = y_min + glyph.size.y * scale;

    [
        [x_min, y_max, 0.0, 0.0],
        [x_min, y_min, 0.0, 1.0],
        [x_max, y_max, 1.0, 0.0],
        [x_max, y_min, 1.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::num::NonZeroU32;

    fn test_glyph(size: (f32, f32), bearing: (f32, f32), advance: f32) -> Glyph {
        Glyph {
            texture: glow::NativeTexture(NonZeroU32::new(1).unwrap()),
            size: Vector2::new(size.0, size.1),
            bearing: Vector2::new(bearing.0, bearing.1),
            advance,
        }
    }

    #[test]
    fn test_glyph_quad_offsets_by_bearing() {
        let glyph = test_glyph((10.0, 20.0), (2.0, -3.0), 12.0);
        let quad = glyph_quad(100.0, 50.0, 1.0, &glyph);

        // Bottom-left corner: pen plus bearing, descender dips below baseline
        assert_relative_eq!(quad[1][0], 102.0);
        assert_relative_eq!(quad[1][1], 47.0);
        // Top-right corner spans the bitmap size
        assert_relative_eq!(quad[2][0], 112.0);
        assert_relative_eq!(quad[2][1], 67.0);
    }

    #[test]
    fn test_glyph_quad_applies_scale() {
        let glyph = test_glyph((10.0, 20.0), (2.0, 4.0), 12.0);
        let quad = glyph_quad(0.0, 0.0, 2.0, &glyph);

        assert_relative_eq!(quad[1][0], 4.0);
        assert_relative_eq!(quad[1][1], 8.0);
        assert_relative_eq!(quad[2][0], 24.0);
        assert_relative_eq!(quad[2][1], 48.0);
    }

    #[test]
    fn test_glyph_quad_uv_corners() {
        let quad = glyph_quad(0.0, 0.0, 1.0, &test_glyph((8.0, 8.0), (0.0, 0.0), 8.0));

        // v = 0 at the top edge: bitmap row 0 is the top of the glyph
        assert_eq!([quad[0][2], quad[0][3]], [0.0, 0.0]);
        assert_eq!([quad[1][2], quad[1][3]], [0.0, 1.0]);
        assert_eq!([quad[2][2], quad[2][3]], [1.0, 0.0]);
        assert_eq!([quad[3][2], quad[3][3]], [1.0, 1.0]);
    }

    #[test]
    fn test_quad_byte_size_matches_buffer_allocation() {
        assert_eq!(
            std::mem::size_of::<QuadVertices>(),
            4 * 4 * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn test_ortho_projection_maps_viewport_corners() {
        let projection = ortho_projection(800, 600);

        let bottom_left = projection.transform_point(&Point3::new(0.0, 0.0, 0.0));
        let top_right = projection.transform_point(&Point3::new(800.0, 600.0, 0.0));

        assert_relative_eq!(bottom_left.x, -1.0);
        assert_relative_eq!(bottom_left.y, -1.0);
        assert_relative_eq!(top_right.x, 1.0);
        assert_relative_eq!(top_right.y, 1.0);
    }

    #[test]
    fn test_builtin_shader_sources_reference_uniforms() {
        assert!(TEXT_VERTEX_SRC.contains("projection"));
        assert!(TEXT_FRAGMENT_SRC.contains("textColor"));
    }

    #[test]
    fn test_font_read_error_names_path() {
        let err = TextError::FontRead {
            path: PathBuf::from("/no/such/font.ttf"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/no/such/font.ttf"));
    }
}
