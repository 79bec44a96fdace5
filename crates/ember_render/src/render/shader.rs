//! GLSL shader program wrapper
//!
//! Compiles a vertex + fragment source pair into a linked GL program and
//! exposes a typed, name-keyed uniform API. Failures carry the exact
//! diagnostic payload: the offending file path for reads, the raw driver
//! info log for compile and link errors.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use glow::HasContext;
use nalgebra::{Matrix2, Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// Result type for shader operations
pub type ShaderResult<T> = Result<T, ShaderError>;

/// Errors that can occur while building a shader program
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// A GLSL source file could not be opened or read
    #[error("FILE_NOT_SUCCESSFULLY_READ: {path}: {source}")]
    SourceRead {
        /// Path of the file that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The GL driver refused to allocate a shader or program object
    #[error("failed to create GL {0} object: {1}")]
    ObjectCreation(&'static str, String),

    /// A shader stage failed to compile; carries the raw compiler log
    #[error("shader '{name}': {stage} stage failed to compile:\n{log}")]
    Compile {
        /// Display name of the program being built
        name: String,
        /// Stage that failed
        stage: ShaderStage,
        /// Raw compiler info log
        log: String,
    },

    /// The program failed to link; carries the raw linker log
    #[error("shader '{name}': program failed to link:\n{log}")]
    Link {
        /// Display name of the program being built
        name: String,
        /// Raw linker info log
        log: String,
    },
}

/// Pipeline stage a GLSL source feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

impl ShaderStage {
    fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// In-memory GLSL source pair for one program
#[derive(Debug, Clone)]
pub struct ShaderSource {
    /// Vertex stage source text
    pub vertex: String,
    /// Fragment stage source text
    pub fragment: String,
}

impl ShaderSource {
    /// Read both stage sources from disk in full, synchronously.
    ///
    /// Either file failing to open or read yields
    /// [`ShaderError::SourceRead`] naming the path.
    pub fn load(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> ShaderResult<Self> {
        Ok(Self {
            vertex: read_source(vertex_path.as_ref())?,
            fragment: read_source(fragment_path.as_ref())?,
        })
    }

    /// Wrap source text already in memory, e.g. `include_str!` builtins.
    pub fn from_strs(vertex: &str, fragment: &str) -> Self {
        Self {
            vertex: vertex.to_string(),
            fragment: fragment.to_string(),
        }
    }
}

fn read_source(path: &Path) -> ShaderResult<String> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::SourceRead {
        path: path.to_path_buf(),
        source,
    })
}

/// A compiled and linked GPU shader program.
///
/// On every `Ok` construction the handle is valid and linked; no partial
/// state is observable. Dropping a `ShaderProgram` never touches the GPU:
/// the program object is released only by an explicit [`destroy`] call, so
/// callers keep manual control over shared lifetimes.
///
/// [`destroy`]: ShaderProgram::destroy
pub struct ShaderProgram {
    program: glow::NativeProgram,
    name: String,
}

impl ShaderProgram {
    /// Compile and link a program from in-memory sources.
    ///
    /// Per-stage shader objects are detached and deleted once the link has
    /// run, whether or not it succeeded.
    pub fn new(gl: &glow::Context, name: &str, source: &ShaderSource) -> ShaderResult<Self> {
        let vertex = compile_stage(gl, name, ShaderStage::Vertex, &source.vertex)?;
        let fragment = match compile_stage(gl, name, ShaderStage::Fragment, &source.fragment) {
            Ok(shader) => shader,
            Err(err) => {
                unsafe { gl.delete_shader(vertex) };
                return Err(err);
            }
        };

        let program = match unsafe { gl.create_program() } {
            Ok(program) => program,
            Err(reason) => {
                unsafe {
                    gl.delete_shader(vertex);
                    gl.delete_shader(fragment);
                }
                return Err(ShaderError::ObjectCreation("program", reason));
            }
        };

        let linked = unsafe {
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            gl.get_program_link_status(program)
        };

        // Stage objects are no longer needed once the link has run.
        unsafe {
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
        }

        if !linked {
            let log = unsafe { gl.get_program_info_log(program) };
            unsafe { gl.delete_program(program) };
            return Err(ShaderError::Link {
                name: name.to_string(),
                log,
            });
        }

        log::debug!("Linked shader program '{}'", name);

        Ok(Self {
            program,
            name: name.to_string(),
        })
    }

    /// Read both GLSL files, then compile and link them.
    pub fn from_files(
        gl: &glow::Context,
        name: &str,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> ShaderResult<Self> {
        let source = ShaderSource::load(vertex_path, fragment_path)?;
        Self::new(gl, name, &source)
    }

    /// Make this program active in the current context.
    ///
    /// Side effect only. Handle validity is a precondition; a destroyed
    /// handle is undefined behavior in the underlying API, not guarded here.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    /// Raw GL program handle
    pub fn handle(&self) -> glow::NativeProgram {
        self.program
    }

    /// Display name given at construction
    pub fn name(&self) -> &str {
        &self.name
    }

    fn location(&self, gl: &glow::Context, name: &str) -> Option<glow::NativeUniformLocation> {
        // A name with no active uniform yields None, which GL treats as a
        // silent no-op location. Not detected or reported, per the GL
        // contract this wrapper inherits.
        unsafe { gl.get_uniform_location(self.program, name) }
    }

    /// Set a boolean uniform (uploaded as an integer, GLSL convention).
    pub fn set_bool(&self, gl: &glow::Context, name: &str, value: bool) {
        unsafe { gl.uniform_1_i32(self.location(gl, name).as_ref(), i32::from(value)) };
    }

    /// Set an integer uniform.
    pub fn set_int(&self, gl: &glow::Context, name: &str, value: i32) {
        unsafe { gl.uniform_1_i32(self.location(gl, name).as_ref(), value) };
    }

    /// Set a float uniform.
    pub fn set_float(&self, gl: &glow::Context, name: &str, value: f32) {
        unsafe { gl.uniform_1_f32(self.location(gl, name).as_ref(), value) };
    }

    /// Set a vec2 uniform.
    pub fn set_vec2(&self, gl: &glow::Context, name: &str, value: &Vector2<f32>) {
        self.set_vec2_xy(gl, name, value.x, value.y);
    }

    /// Set a vec2 uniform from components.
    pub fn set_vec2_xy(&self, gl: &glow::Context, name: &str, x: f32, y: f32) {
        unsafe { gl.uniform_2_f32(self.location(gl, name).as_ref(), x, y) };
    }

    /// Set a vec3 uniform.
    pub fn set_vec3(&self, gl: &glow::Context, name: &str, value: &Vector3<f32>) {
        self.set_vec3_xyz(gl, name, value.x, value.y, value.z);
    }

    /// Set a vec3 uniform from components.
    pub fn set_vec3_xyz(&self, gl: &glow::Context, name: &str, x: f32, y: f32, z: f32) {
        unsafe { gl.uniform_3_f32(self.location(gl, name).as_ref(), x, y, z) };
    }

    /// Set a vec4 uniform.
    pub fn set_vec4(&self, gl: &glow::Context, name: &str, value: &Vector4<f32>) {
        self.set_vec4_xyzw(gl, name, value.x, value.y, value.z, value.w);
    }

    /// Set a vec4 uniform from components.
    pub fn set_vec4_xyzw(&self, gl: &glow::Context, name: &str, x: f32, y: f32, z: f32, w: f32) {
        unsafe { gl.uniform_4_f32(self.location(gl, name).as_ref(), x, y, z, w) };
    }

    /// Set a mat2 uniform (column-major, no transpose).
    pub fn set_mat2(&self, gl: &glow::Context, name: &str, value: &Matrix2<f32>) {
        let location = self.location(gl, name);
        unsafe { gl.uniform_matrix_2_f32_slice(location.as_ref(), false, value.as_slice()) };
    }

    /// Set a mat3 uniform (column-major, no transpose).
    pub fn set_mat3(&self, gl: &glow::Context, name: &str, value: &Matrix3<f32>) {
        let location = self.location(gl, name);
        unsafe { gl.uniform_matrix_3_f32_slice(location.as_ref(), false, value.as_slice()) };
    }

    /// Set a mat4 uniform (column-major, no transpose).
    pub fn set_mat4(&self, gl: &glow::Context, name: &str, value: &Matrix4<f32>) {
        let location = self.location(gl, name);
        unsafe { gl.uniform_matrix_4_f32_slice(location.as_ref(), false, value.as_slice()) };
    }

    /// Release the GPU program object.
    ///
    /// Call at most once after a successful construction; deleting an
    /// already-released handle is implementation-defined in GL. Drop never
    /// calls this, so wrappers sharing one handle cannot double-release it.
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}

fn compile_stage(
    gl: &glow::Context,
    name: &str,
    stage: ShaderStage,
    source: &str,
) -> ShaderResult<glow::NativeShader> {
    let shader = unsafe { gl.create_shader(stage.gl_type()) }
        .map_err(|e| ShaderError::ObjectCreation("shader", e))?;

    unsafe {
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
    }

    if unsafe { gl.get_shader_compile_status(shader) } {
        Ok(shader)
    } else {
        let log = unsafe { gl.get_shader_info_log(shader) };
        unsafe { gl.delete_shader(shader) };
        Err(ShaderError::Compile {
            name: name.to_string(),
            stage,
            log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let file_name = format!("ember_shader_{}_{}", std::process::id(), name);
        let path = std::env::temp_dir().join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_source_load_reads_both_files() {
        let vert = write_temp("ok.vert", "void main() { gl_Position = vec4(0.0); }");
        let frag = write_temp("ok.frag", "void main() {}");

        let source = ShaderSource::load(&vert, &frag).unwrap();
        assert!(source.vertex.contains("gl_Position"));
        assert_eq!(source.fragment, "void main() {}");

        let _ = std::fs::remove_file(vert);
        let _ = std::fs::remove_file(frag);
    }

    #[test]
    fn test_source_load_missing_vertex_file() {
        let frag = write_temp("lonely.frag", "void main() {}");

        let err = ShaderSource::load("/no/such/dir/missing.vert", &frag).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("FILE_NOT_SUCCESSFULLY_READ"));
        assert!(message.contains("missing.vert"));

        let _ = std::fs::remove_file(frag);
    }

    #[test]
    fn test_source_load_missing_fragment_file() {
        let vert = write_temp("lonely.vert", "void main() {}");

        let err = ShaderSource::load(&vert, "/no/such/dir/missing.frag").unwrap_err();
        assert!(matches!(
            err,
            ShaderError::SourceRead { ref path, .. } if path.ends_with("missing.frag")
        ));

        let _ = std::fs::remove_file(vert);
    }

    #[test]
    fn test_from_strs_keeps_text_verbatim() {
        let source = ShaderSource::from_strs("vertex src", "fragment src");
        assert_eq!(source.vertex, "vertex src");
        assert_eq!(source.fragment, "fragment src");
    }

    #[test]
    fn test_compile_error_preserves_raw_log() {
        let err = ShaderError::Compile {
            name: "text".to_string(),
            stage: ShaderStage::Fragment,
            log: "0:12(3): error: 'coverage' undeclared".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("fragment"));
        assert!(message.contains("0:12(3): error: 'coverage' undeclared"));
    }

    #[test]
    fn test_link_error_preserves_raw_log() {
        let err = ShaderError::Link {
            name: "text".to_string(),
            log: "error: vertex shader output not read by fragment shader".to_string(),
        };
        assert!(err.to_string().contains("output not read"));
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
