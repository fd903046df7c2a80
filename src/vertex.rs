use bytemuck::{Pod, Zeroable};

use crate::{math::Point, Color};

/// The corners of a unit quad, in the order sprite vertices are emitted.
pub const QUAD_VERTICES: [[f32; 2]; 4] = [[0., 0.], [1., 0.], [1., 1.], [0., 1.]];

/// The two triangles that make up a quad built from [`QUAD_VERTICES`].
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// A single vertex as it is laid out in vertex buffers.
#[derive(Pod, Zeroable, Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vertex {
    /// The location of the vertex.
    pub position: [f32; 2],
    /// The color of the vertex, as 8-bit RGBA.
    pub color: [u8; 4],
    /// The texture coordinate sampled at this vertex.
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Returns a new vertex.
    #[must_use]
    pub fn new(position: Point, color: Color, tex_coord: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            color: color.rgba8(),
            tex_coord,
        }
    }

    /// Returns the position as a [`Point`].
    #[must_use]
    pub fn location(&self) -> Point {
        Point::from(self.position)
    }

    /// Builder-style function. Replaces the color and returns self.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color.rgba8();
        self
    }
}
