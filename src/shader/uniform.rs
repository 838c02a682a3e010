
use gl::types::*;
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::color::Color;

/// Everything which implements this trait can be stored into a uniform of a
/// shader through [`ShaderProgram::set_uniform`](super::ShaderProgram::set_uniform).
pub trait UniformValue: Sized {
    /// # Safety
    /// `location` must belong to the currently bound program.
    unsafe fn set_uniform(value: &Self, location: GLint);
}

impl UniformValue for f32 {
    unsafe fn set_uniform(value: &f32, location: GLint) {
        gl::Uniform1f(location, *value);
    }
}

impl UniformValue for Vec2 {
    unsafe fn set_uniform(vec: &Vec2, location: GLint) {
        gl::Uniform2f(location, vec.x, vec.y);
    }
}

impl UniformValue for Vec3 {
    unsafe fn set_uniform(vec: &Vec3, location: GLint) {
        gl::Uniform3f(location, vec.x, vec.y, vec.z);
    }
}

impl UniformValue for Vec4 {
    unsafe fn set_uniform(vec: &Vec4, location: GLint) {
        gl::Uniform4f(location, vec.x, vec.y, vec.z, vec.w);
    }
}

impl UniformValue for Mat4 {
    unsafe fn set_uniform(mat: &Mat4, location: GLint) {
        // glam matrices are column-major, same as GL; no transpose.
        let columns: &[f32; 16] = mat.as_ref();
        gl::UniformMatrix4fv(location, 1, gl::FALSE, columns.as_ptr());
    }
}

impl UniformValue for Color {
    unsafe fn set_uniform(color: &Color, location: GLint) {
        gl::Uniform4f(location, color.r, color.g, color.b, color.a);
    }
}
