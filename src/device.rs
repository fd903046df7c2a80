//! The boundary between batches and the graphics API.
//!
//! Batches never talk to a graphics API directly. Everything they need is
//! requested from a [`GraphicsDevice`] that the caller passes in: capability
//! queries, buffer objects for static geometry, and the indexed draw call
//! itself.

use std::fmt::Debug;

use crate::{math::Projection, BlendState, Shader, Texture, Vertex};

/// Optional capabilities a [`GraphicsDevice`] may support.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Feature {
    /// GPU-resident vertex and index storage.
    VertexBufferObjects,
    /// Offscreen render targets.
    FrameBufferObjects,
}

/// How a list of indices is assembled into primitives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PrimitiveType {
    /// One vertex per point.
    Points,
    /// Two vertices per line.
    Lines,
    /// Three vertices per triangle.
    Triangles,
    /// Three vertices for the first triangle, one for each after.
    TriangleStrip,
    /// Three vertices for the first triangle, one for each after, all sharing
    /// the first vertex.
    TriangleFan,
}

/// Identifies a buffer object created by a [`GraphicsDevice`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BufferId(pub u64);

/// Vertex and index storage that lives on the GPU.
///
/// Dropping a buffer object releases its storage.
pub trait VertexBufferObject: Debug {
    /// Returns the identity of this buffer.
    fn id(&self) -> BufferId;

    /// Replaces the entire contents of the buffer.
    fn upload(&mut self, vertices: &[Vertex], indices: &[u32]);

    /// Overwrites `vertices.len()` vertices starting at `offset`. Indices are
    /// left untouched.
    fn upload_sub(&mut self, offset: usize, vertices: &[Vertex]);

    /// Returns the number of indices most recently uploaded.
    fn index_count(&self) -> usize;
}

/// Where the vertex data of a [`DrawCall`] comes from.
#[derive(Debug, Clone, Copy)]
pub enum VertexSource<'a> {
    /// CPU-side arrays, submitted with the call.
    Arrays {
        /// The vertices referenced by `indices`.
        vertices: &'a [Vertex],
        /// The indices to draw.
        indices: &'a [u32],
    },
    /// A buffer object previously uploaded.
    Buffer(&'a dyn VertexBufferObject),
}

impl VertexSource<'_> {
    /// Returns the number of indices that will be drawn.
    #[must_use]
    pub fn index_count(&self) -> usize {
        match self {
            Self::Arrays { indices, .. } => indices.len(),
            Self::Buffer(buffer) => buffer.index_count(),
        }
    }
}

/// Everything needed to issue one indexed draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// How indices are assembled into primitives.
    pub primitive: PrimitiveType,
    /// The geometry to draw.
    pub source: VertexSource<'a>,
    /// The texture to bind, if any.
    pub texture: Option<&'a Texture>,
    /// The shader to bind. `None` selects the device's default shader.
    pub shader: Option<&'a Shader>,
    /// The blend state to apply.
    pub blend: BlendState,
    /// The projection matrix uniform.
    pub projection: &'a Projection,
}

/// A rendering context. Created alongside the graphics context and torn down
/// with it; batches borrow it for the duration of a call.
pub trait GraphicsDevice {
    /// Returns true if `feature` is available.
    fn is_supported(&self, feature: Feature) -> bool;

    /// Creates a new, empty buffer object.
    ///
    /// Only called after [`Self::is_supported`] returned true for
    /// [`Feature::VertexBufferObjects`].
    fn create_vertex_buffer(&mut self) -> Box<dyn VertexBufferObject>;

    /// Issues an indexed draw.
    fn draw_indexed(&mut self, call: &DrawCall<'_>);
}
