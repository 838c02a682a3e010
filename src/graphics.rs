
//! Wrappers for unsafe OpenGL state calls.

use gl::types::*;
use log::warn;

use crate::color::Color;

/// Sets the OpenGL viewport.
pub fn viewport(x: u32, y: u32, width: u32, height: u32) {
    unsafe {
        gl::Viewport(x as GLint, y as GLint, width as GLsizei, height as GLsizei);
    }
}

/// Clears the currently bound framebuffer. Passing `None` for the color
/// leaves the color buffer alone.
pub fn clear(color: Option<Color>, depth: bool, stencil: bool) {
    unsafe {
        if let Some(color) = color {
            gl::ClearColor(color.r, color.g, color.b, color.a);
        }
        let mut mask = 0;
        if color.is_some() { mask |= gl::COLOR_BUFFER_BIT }
        if depth           { mask |= gl::DEPTH_BUFFER_BIT }
        if stencil         { mask |= gl::STENCIL_BUFFER_BIT }
        gl::Clear(mask);
    }
}

/// Toggles depth testing.
pub fn set_depth_testing(enabled: bool) {
    unsafe {
        if enabled {
            gl::Enable(gl::DEPTH_TEST);
        } else {
            gl::Disable(gl::DEPTH_TEST);
        }
    }
}

/// Drains all pending OpenGL errors into the log.
pub fn log_errors() {
    unsafe {
        while let Some(error) = get_error_message(gl::GetError()) {
            warn!("OpenGL error: {}", error);
        }
    }
}

fn get_error_message(error: GLenum) -> Option<String> {
    let value = match error {
        gl::INVALID_VALUE                   => "Invalid value",
        gl::INVALID_ENUM                    => "Invalid enum",
        gl::INVALID_OPERATION               => "Invalid operation",
        gl::INVALID_FRAMEBUFFER_OPERATION   => "Invalid framebuffer operation",
        gl::OUT_OF_MEMORY                   => "Out of memory",

        gl::NO_ERROR                        => return None,
        _                                   => return Some(format!("Invalid error code: {:x}", error)),
    };
    Some(String::from(value))
}
