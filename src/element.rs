
use std::cell::RefCell;
use std::mem;
use std::ptr;
use std::rc::Rc;

use gl::types::*;

use crate::error::Result;
use crate::mesh::{Mesh, VERTEX_LAYOUT, VERTEX_STRIDE};
use crate::shader::ShaderProgram;
use crate::transform::Transform;

/// The uniform name under which every element uploads its model transform.
/// Shaders used with [`Element`] declare a `mat4` of this name.
pub const MODEL_MATRIX_UNIFORM: &str = "model_matrix";

/// One drawable unit: a GPU buffer set, a transform and a shared shader.
///
/// The geometry is uploaded once at creation and is immutable afterwards;
/// animation happens by mutating [`Element::transform`] between frames.
pub struct Element {
    vao: GLuint,
    vbo: GLuint,
    ebo: GLuint,
    index_count: usize,
    pub transform: Transform,
    shader: Rc<RefCell<ShaderProgram>>,
}

impl Element {
    /// Validates the shader against the fixed vertex layout, packs the mesh
    /// and uploads it into a fresh buffer set. There is no partial update
    /// path; build a new element for new geometry.
    pub fn new(mesh: &Mesh, shader: Rc<RefCell<ShaderProgram>>) -> Result<Element> {
        shader.borrow().validate_layout()?;

        let data = mesh.pack();
        let indices = mesh.indices();

        let mut vao = 0;
        let mut vbo = 0;
        let mut ebo = 0;

        unsafe {
            gl::GenBuffers(1, &mut ebo);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                (indices.len() * mem::size_of::<u32>()) as GLsizeiptr,
                indices.as_ptr() as *const GLvoid,
                gl::STATIC_DRAW,
            );

            gl::GenBuffers(1, &mut vbo);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (data.len() * mem::size_of::<f32>()) as GLsizeiptr,
                data.as_ptr() as *const GLvoid,
                gl::STATIC_DRAW,
            );

            gl::GenVertexArrays(1, &mut vao);
            gl::BindVertexArray(vao);

            let stride = (VERTEX_STRIDE * mem::size_of::<f32>()) as GLsizei;
            for (slot, attrib) in VERTEX_LAYOUT.iter().enumerate() {
                gl::EnableVertexAttribArray(slot as GLuint);
                gl::VertexAttribPointer(
                    slot as GLuint,
                    attrib.components as GLint,
                    gl::FLOAT,
                    gl::FALSE,
                    stride,
                    (attrib.offset * mem::size_of::<f32>()) as *const GLvoid,
                );
            }

            gl::BindVertexArray(0);
        }

        Ok(Element {
            vao,
            vbo,
            ebo,
            index_count: mesh.index_count(),
            transform: Transform::new(),
            shader,
        })
    }

    /// Binds the element's shader, uploads the current model matrix under
    /// [`MODEL_MATRIX_UNIFORM`], binds the buffer set and issues a single
    /// indexed triangle-list draw over the element's full index count.
    pub fn draw(&self) {
        let shader = self.shader.borrow();
        shader.bind();
        shader.set_uniform(MODEL_MATRIX_UNIFORM, self.transform.matrix());

        unsafe {
            gl::BindVertexArray(self.vao);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.ebo);
            gl::DrawElements(
                gl::TRIANGLES,
                self.index_count as GLsizei,
                gl::UNSIGNED_INT,
                ptr::null(),
            );
        }
    }

    /// The shared program this element draws with.
    pub fn shader(&self) -> &Rc<RefCell<ShaderProgram>> {
        &self.shader
    }

    /// How many indices every [`Element::draw`] call submits.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &mut self.vao);
            gl::DeleteBuffers(1, &mut self.vbo);
            gl::DeleteBuffers(1, &mut self.ebo);
        }
    }
}
