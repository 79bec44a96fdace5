//! Text rendering demo
//!
//! Opens a GL window and draws text with `ember_render`'s TextRenderer.
//! This application is the terminating party for engine errors: failures
//! surface here as `Result`s, get logged with their full cause chain, and
//! exit with a non-zero status.

mod config;
mod window;

use std::error::Error;
use std::process::ExitCode;

use glfw::{Action, Key, WindowEvent};
use glow::HasContext;
use nalgebra::Vector3;

use config::DemoConfig;
use ember_render::render::TextRenderer;
use window::Window;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            let mut source = err.source();
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = DemoConfig::load("text_demo.toml")?;

    log::info!("Creating window {}x{}", config.width, config.height);
    let mut window = Window::new(&config.title, config.width, config.height)?;
    let gl = window.load_gl();

    // Framebuffer size can differ from window size on hi-DPI displays.
    let (fb_width, fb_height) = window.framebuffer_size();
    unsafe { gl.viewport(0, 0, fb_width as i32, fb_height as i32) };

    let text = TextRenderer::new(
        &gl,
        &config.font_path,
        config.font_size,
        config.width,
        config.height,
    )?;

    // Glyph coverage lives in the alpha channel.
    unsafe {
        gl.enable(glow::BLEND);
        gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
    }

    let white = Vector3::new(1.0, 1.0, 1.0);
    let amber = Vector3::new(1.0, 0.75, 0.2);
    let caption = "press ESC to quit";

    while !window.should_close() {
        window.poll_events();
        let mut close_requested = false;
        for (_, event) in window.flush_events() {
            match event {
                WindowEvent::Key(Key::Escape, _, Action::Press, _) | WindowEvent::Close => {
                    close_requested = true;
                }
                _ => {}
            }
        }
        if close_requested {
            window.set_should_close(true);
        }

        unsafe {
            gl.clear_color(0.10, 0.10, 0.12, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }

        text.draw(&gl, "ember render", 25.0, 25.0, 1.0, white);

        let caption_x = (config.width as f32 - text.line_width(caption, 0.5)) / 2.0;
        text.draw(
            &gl,
            caption,
            caption_x,
            config.height as f32 - 60.0,
            0.5,
            amber,
        );

        window.swap_buffers();
    }

    text.destroy(&gl);
    Ok(())
}
