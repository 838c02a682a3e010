
//! A small OpenGL rendering helper: window and context creation, shader
//! programs with hot-reload, a quad mesh primitive and a basic render loop.
//!
//! The interesting part is the reload cycle on [`ShaderProgram`]: every
//! frame each element's program polls its two source files, and when either
//! has changed both stages are recompiled and a brand-new program object is
//! swapped in. When the new source does not compile the old program keeps
//! rendering, so shaders can be edited freely while the window is open.
//!
//! # Example
//! ```rust,no_run
//! use easel::{App, Element, Mesh, RenderContext, Result, Scene, ShaderProgram, WindowConfig};
//!
//! struct Spin {
//!     quad: usize,
//! }
//!
//! impl App for Spin {
//!     fn setup(ctx: &mut RenderContext) -> Result<Spin> {
//!         let shader = ShaderProgram::new(
//!             "assets/shaders/quad.vert",
//!             "assets/shaders/quad.frag",
//!         )?.shared();
//!         let quad = ctx.add_element(Element::new(&Mesh::quad(), shader)?);
//!         Ok(Spin { quad })
//!     }
//!
//!     fn update(&mut self, scene: &mut Scene) {
//!         if let Some(quad) = scene.get_mut(self.quad) {
//!             quad.transform.rotation.z += 1.0;
//!         }
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     RenderContext::new(WindowConfig::default())?.run::<Spin>()
//! }
//! ```

pub mod color;
pub mod context;
pub mod element;
pub mod error;
pub mod graphics;
pub mod mesh;
pub mod shader;
pub mod transform;

pub use color::Color;
pub use context::{App, RenderContext, Scene, WindowConfig};
pub use element::{Element, MODEL_MATRIX_UNIFORM};
pub use error::{RenderError, Result};
pub use mesh::{AttribFormat, Mesh, Semantic, Vertex, VERTEX_LAYOUT, VERTEX_STRIDE};
pub use shader::{Reload, ShaderProgram, ShaderStage, UniformValue};
pub use transform::Transform;

// Re-exported so applications can write key handlers without depending on
// glfw directly.
pub use glfw::{Action, Key, Modifiers};
