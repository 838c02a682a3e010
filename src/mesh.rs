
//! The fixed vertex layout and CPU-side geometry for elements.
//!
//! Every element in this library shares one interleaved vertex layout,
//! described by [`VERTEX_LAYOUT`]. The same schema drives both the GPU
//! upload in [`Element`](crate::element::Element) and the shader
//! compatibility check in
//! [`ShaderProgram::validate_layout`](crate::shader::ShaderProgram::validate_layout),
//! so the offsets exist in exactly one place.

use crate::error::{RenderError, Result};

/// What an attribute slot carries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Semantic {
    Position,
    Color,
    TexCoord,
}

impl Semantic {
    /// The input name shaders are expected to use for this slot.
    pub fn glsl_name(self) -> &'static str {
        match self {
            Semantic::Position => "position",
            Semantic::Color => "color",
            Semantic::TexCoord => "tex_coord",
        }
    }
}

/// One entry of the interleaved vertex layout. Component counts and offsets
/// are in floats, not bytes.
#[derive(Debug, Copy, Clone)]
pub struct AttribFormat {
    pub semantic: Semantic,
    pub components: usize,
    pub offset: usize,
}

/// The layout every element and shader agrees on: slot 0 holds the position
/// (3 floats), slot 1 the color (4 floats), slot 2 the texture coordinate
/// (2 floats). Offsets follow from the component counts of the preceding
/// slots.
pub const VERTEX_LAYOUT: [AttribFormat; 3] = [
    AttribFormat { semantic: Semantic::Position, components: 3, offset: 0 },
    AttribFormat { semantic: Semantic::Color,    components: 4, offset: 3 },
    AttribFormat { semantic: Semantic::TexCoord, components: 2, offset: 7 },
];

/// Stride of one interleaved vertex, in floats.
pub const VERTEX_STRIDE: usize = 9;

/// A single vertex before packing.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub tex_coord: [f32; 2],
}

/// Geometry for one element: a vertex list plus a triangle index list.
/// Immutable once built; elements upload it exactly once.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Creates a mesh, checking that the index list describes whole
    /// triangles and only references vertices that exist.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Mesh> {
        if indices.len() % 3 != 0 {
            return Err(RenderError::Geometry(format!(
                "index count {} is not a multiple of 3",
                indices.len(),
            )));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(RenderError::Geometry(format!(
                "index {} is out of range for {} vertices",
                index,
                vertices.len(),
            )));
        }

        Ok(Mesh { vertices, indices })
    }

    /// The reference quad: a half-unit square in the xy-plane with a red,
    /// green, blue and magenta corner, drawn as two triangles.
    pub fn quad() -> Mesh {
        let vertices = vec![
            Vertex { position: [-0.5,  0.5, 0.0], color: [1.0, 0.0, 0.0, 1.0], tex_coord: [0.0, 0.0] },
            Vertex { position: [-0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0, 1.0], tex_coord: [0.0, 1.0] },
            Vertex { position: [ 0.5, -0.5, 0.0], color: [0.0, 0.0, 1.0, 1.0], tex_coord: [1.0, 1.0] },
            Vertex { position: [ 0.5,  0.5, 0.0], color: [1.0, 0.0, 1.0, 1.0], tex_coord: [1.0, 0.0] },
        ];
        let indices = vec![0, 1, 2, 2, 3, 0];

        Mesh { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Interleaves all attributes into a single buffer matching
    /// [`VERTEX_LAYOUT`], [`VERTEX_STRIDE`] floats per vertex.
    pub fn pack(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.vertices.len() * VERTEX_STRIDE);
        for vertex in &self.vertices {
            data.extend_from_slice(&vertex.position);
            data.extend_from_slice(&vertex.color);
            data.extend_from_slice(&vertex.tex_coord);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn layout_offsets_follow_from_component_counts() {
        let mut expected_offset = 0;
        for attrib in VERTEX_LAYOUT.iter() {
            assert_eq!(attrib.offset, expected_offset);
            expected_offset += attrib.components;
        }
        assert_eq!(expected_offset, VERTEX_STRIDE);
    }

    #[test]
    fn quad_is_two_triangles_over_four_distinct_vertices() {
        let quad = Mesh::quad();

        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.index_count(), 6);
        assert!(quad.indices().iter().all(|&index| index < 4));

        let distinct: HashSet<u32> = quad.indices().iter().copied().collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn packing_interleaves_per_the_layout() {
        let quad = Mesh::quad();
        let data = quad.pack();

        assert_eq!(data.len(), quad.vertex_count() * VERTEX_STRIDE);

        // Second vertex: position at the stride boundary, color and texture
        // coordinate at their schema offsets.
        let base = VERTEX_STRIDE;
        assert_eq!(&data[base..base + 3], &[-0.5, -0.5, 0.0]);
        assert_eq!(&data[base + 3..base + 7], &[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(&data[base + 7..base + 9], &[0.0, 1.0]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let quad = Mesh::quad();
        let result = Mesh::new(quad.vertices.clone(), vec![0, 1, 4]);

        assert!(matches!(result, Err(RenderError::Geometry(_))));
    }

    #[test]
    fn ragged_triangle_list_is_rejected() {
        let quad = Mesh::quad();
        let result = Mesh::new(quad.vertices.clone(), vec![0, 1, 2, 3]);

        assert!(matches!(result, Err(RenderError::Geometry(_))));
    }

    #[test]
    fn empty_mesh_is_valid() {
        let mesh = Mesh::new(Vec::new(), Vec::new()).unwrap();
        assert_eq!(mesh.index_count(), 0);
        assert!(mesh.pack().is_empty());
    }
}
