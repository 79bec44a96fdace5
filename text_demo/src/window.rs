//! GLFW window with an OpenGL 3.3 core context
//!
//! Owns the GLFW instance, the window, and its event receiver. The GL
//! context is made current on the creating thread and stays there; the
//! engine requires every GL call to happen on that thread.

use glfw::Context as _;
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW library initialization failed
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// Window or GL context creation failed
    #[error("Window creation failed")]
    CreationFailed,
}

/// GLFW window wrapper that owns the GL context
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl Window {
    /// Create a window and make its GL context current on this thread.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, WindowError> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|_| WindowError::InitializationFailed)?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
            glfw::OpenGlProfileHint::Core,
        ));
        glfw.window_hint(glfw::WindowHint::Resizable(false));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.make_current();
        window.set_key_polling(true);
        window.set_close_polling(true);
        glfw.set_swap_interval(glfw::SwapInterval::Sync(1));

        Ok(Self {
            glfw,
            window,
            events,
        })
    }

    /// Build a glow context from the window's proc loader.
    pub fn load_gl(&mut self) -> glow::Context {
        unsafe {
            glow::Context::from_loader_function(|name| {
                self.window.get_proc_address(name) as *const _
            })
        }
    }

    /// Check if the window should close
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Set whether the window should close
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Poll for events
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    /// Drain queued window events
    pub fn flush_events(&self) -> glfw::FlushedMessages<'_, (f64, glfw::WindowEvent)> {
        glfw::flush_messages(&self.events)
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width as u32, height as u32)
    }
}
