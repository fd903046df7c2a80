use std::collections::HashMap;

use crate::{
    device::{DrawCall, Feature, GraphicsDevice, PrimitiveType, VertexBufferObject, VertexSource},
    math::Projection,
    texture::TextureId,
    BlendState, Error, Shader, Texture, Vertex,
};

/// The vertices and indices drawn with a single texture.
#[derive(Debug)]
pub struct VertexBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    draw_order: u32,
    texture: Option<Texture>,
    resident: Option<Box<dyn VertexBufferObject>>,
}

impl VertexBuffer {
    fn new(draw_order: u32, texture: Option<Texture>) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            draw_order,
            texture,
            resident: None,
        }
    }

    /// The vertices submitted to this buffer, in append order.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The indices submitted to this buffer. Each index refers to a vertex in
    /// [`Self::vertices`].
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The position of this buffer in the batch's draw sequence.
    #[must_use]
    pub const fn draw_order(&self) -> u32 {
        self.draw_order
    }

    /// The texture this buffer is drawn with.
    #[must_use]
    pub const fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Returns true if this buffer has been uploaded to a buffer object.
    #[must_use]
    pub fn is_resident(&self) -> bool {
        self.resident.is_some()
    }

    /// The buffer object holding this buffer's contents, if it is resident.
    #[must_use]
    pub fn resident(&self) -> Option<&dyn VertexBufferObject> {
        self.resident.as_deref()
    }

    fn append(&mut self, vertices: &[Vertex], indices: &[u32]) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices
            .extend(indices.iter().map(|index| index + offset));
    }

    /// Replaces the vertices starting at `offset`, pushing the change to the
    /// buffer object when resident. Returns false if the range is outside of
    /// the buffer.
    pub(crate) fn overwrite(&mut self, offset: usize, vertices: &[Vertex]) -> bool {
        let end = match offset
            .checked_add(vertices.len())
            .filter(|&end| end <= self.vertices.len())
        {
            Some(end) => end,
            None => return false,
        };

        self.vertices[offset..end].copy_from_slice(vertices);
        if let Some(resident) = &mut self.resident {
            resident.upload_sub(offset, vertices);
        }
        true
    }

    fn upload(&mut self, device: &mut dyn GraphicsDevice) {
        let mut resident = device.create_vertex_buffer();
        resident.upload(&self.vertices, &self.indices);
        tracing::debug!(
            buffer = ?resident.id(),
            vertices = self.vertices.len(),
            indices = self.indices.len(),
            "uploaded vertex buffer"
        );
        self.resident = Some(resident);
    }
}

/// Collects geometry submitted in any number of calls, grouped into one
/// [`VertexBuffer`] per texture, and draws each group with a single call.
///
/// A batch is either dynamic, where geometry is sent to the device from CPU
/// memory on every draw, or static, where geometry lives in buffer objects
/// after [`Batch::make_static`] and no longer accepts new submissions.
#[derive(Debug)]
pub struct Batch {
    buffers: HashMap<Option<TextureId>, VertexBuffer>,
    texture: Option<Texture>,
    shader: Option<Shader>,
    blend: BlendState,
    projection: Projection,
    is_static: bool,
    next_draw_order: u32,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

impl Batch {
    /// Returns an empty, dynamic batch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
            texture: None,
            shader: None,
            blend: BlendState::default(),
            projection: Projection::identity(),
            is_static: false,
            next_draw_order: 0,
        }
    }

    /// Sets the projection matrix used when drawing.
    pub fn set_projection_matrix(&mut self, projection: Projection) {
        self.projection = projection;
    }

    /// Returns the projection matrix used when drawing.
    #[must_use]
    pub const fn projection_matrix(&self) -> &Projection {
        &self.projection
    }

    /// Sets the shader used when drawing. `None` selects the device's default.
    pub fn set_shader(&mut self, shader: Option<&Shader>) {
        self.shader = shader.cloned();
    }

    /// Returns the shader used when drawing.
    #[must_use]
    pub const fn shader(&self) -> Option<&Shader> {
        self.shader.as_ref()
    }

    /// Selects the texture that subsequent submissions are grouped under. The
    /// batch keeps a reference to the selected texture until another is
    /// selected.
    pub fn set_texture(&mut self, texture: Option<&Texture>) {
        self.texture = texture.cloned();
    }

    /// Returns the selected texture.
    #[must_use]
    pub const fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Sets the blend state used when drawing.
    pub fn set_blend_state(&mut self, blend: BlendState) {
        self.blend = blend;
    }

    /// Returns the blend state used when drawing.
    #[must_use]
    pub const fn blend_state(&self) -> BlendState {
        self.blend
    }

    /// Returns true once [`Self::make_static`] has succeeded, until
    /// [`Self::clear`] is called.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns the number of per-texture buffers.
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Returns the per-texture buffers in draw order.
    #[must_use]
    pub fn buffers(&self) -> Vec<&VertexBuffer> {
        let mut buffers = self.buffers.values().collect::<Vec<_>>();
        buffers.sort_by_key(|buffer| buffer.draw_order);
        buffers
    }

    /// Returns the buffer for `texture`, if anything has been submitted with
    /// it.
    #[must_use]
    pub fn buffer(&self, texture: Option<&Texture>) -> Option<&VertexBuffer> {
        self.buffers.get(&texture.map(Texture::id))
    }

    pub(crate) fn buffer_mut(&mut self, key: Option<TextureId>) -> Option<&mut VertexBuffer> {
        self.buffers.get_mut(&key)
    }

    /// Appends `vertices` to the selected texture's buffer. `indices` refer to
    /// positions within `vertices` and are offset so they keep referring to
    /// the same vertices once appended.
    ///
    /// Static batches ignore this call, as do submissions with indices outside
    /// of `vertices`.
    pub fn add_vertices(&mut self, vertices: &[Vertex], indices: &[u32]) {
        if self.is_static {
            tracing::warn!("cannot add vertices to a static batch");
            return;
        }

        if let Some(index) = indices
            .iter()
            .copied()
            .find(|&index| index as usize >= vertices.len())
        {
            tracing::error!(
                index,
                vertex_count = vertices.len(),
                "batch submission references a vertex it does not contain"
            );
            return;
        }

        let key = self.texture.as_ref().map(Texture::id);
        let texture = &self.texture;
        let next_draw_order = &mut self.next_draw_order;
        let buffer = self.buffers.entry(key).or_insert_with(|| {
            let draw_order = *next_draw_order;
            *next_draw_order += 1;
            tracing::trace!(draw_order, texture = ?key, "created vertex buffer");
            VertexBuffer::new(draw_order, texture.clone())
        });
        buffer.append(vertices, indices);
    }

    /// Returns vertex `index` of the selected texture's buffer. Out of range
    /// indices return [`Vertex::default`].
    #[must_use]
    pub fn vertex(&self, index: usize) -> Vertex {
        self.vertex_in(self.texture.as_ref(), index)
    }

    /// Returns vertex `index` of `texture`'s buffer. Out of range indices
    /// return [`Vertex::default`].
    #[must_use]
    pub fn vertex_in(&self, texture: Option<&Texture>, index: usize) -> Vertex {
        match self
            .buffer(texture)
            .and_then(|buffer| buffer.vertices.get(index))
        {
            Some(vertex) => *vertex,
            None => {
                tracing::error!(index, "Batch::vertex: index out of bounds");
                Vertex::default()
            }
        }
    }

    /// Replaces vertex `index` of the selected texture's buffer. Out of range
    /// indices are ignored.
    pub fn modify_vertex(&mut self, index: usize, vertex: Vertex) {
        let texture = self.texture.clone();
        self.modify_vertex_in(texture.as_ref(), index, vertex);
    }

    /// Replaces vertex `index` of `texture`'s buffer. If the batch is static,
    /// only that vertex is sent to the buffer object. Out of range indices are
    /// ignored.
    pub fn modify_vertex_in(&mut self, texture: Option<&Texture>, index: usize, vertex: Vertex) {
        let modified = self
            .buffer_mut(texture.map(Texture::id))
            .map_or(false, |buffer| {
                buffer.overwrite(index, std::slice::from_ref(&vertex))
            });
        if !modified {
            tracing::error!(index, "Batch::modify_vertex: index out of bounds");
        }
    }

    /// Draws every buffer, in the order their textures were first submitted.
    pub fn draw(&self, device: &mut dyn GraphicsDevice) {
        for buffer in self.buffers() {
            if buffer.indices.is_empty() {
                continue;
            }

            let source = match &buffer.resident {
                Some(resident) if self.is_static => VertexSource::Buffer(resident.as_ref()),
                _ => VertexSource::Arrays {
                    vertices: &buffer.vertices,
                    indices: &buffer.indices,
                },
            };

            device.draw_indexed(&DrawCall {
                primitive: PrimitiveType::Triangles,
                source,
                texture: buffer.texture.as_ref(),
                shader: self.shader.as_ref(),
                blend: self.blend,
                projection: &self.projection,
            });
        }
    }

    /// Removes all geometry, releasing buffer objects, and returns the batch
    /// to the dynamic state.
    pub fn clear(&mut self) {
        self.buffers.clear();
        self.next_draw_order = 0;
        self.is_static = false;
    }

    /// Uploads every buffer to a buffer object. Afterwards, the batch no
    /// longer accepts new geometry, but [`Self::modify_vertex`] updates the
    /// uploaded data in place.
    ///
    /// Returns [`Error::FeatureUnsupported`] without changing the batch if
    /// `device` has no buffer objects.
    pub fn make_static(&mut self, device: &mut dyn GraphicsDevice) -> crate::Result<()> {
        Self::require_buffer_objects(device)?;
        if self.is_static {
            return Ok(());
        }

        self.upload_all(device);
        Ok(())
    }

    pub(crate) fn require_buffer_objects(device: &dyn GraphicsDevice) -> crate::Result<()> {
        if device.is_supported(Feature::VertexBufferObjects) {
            Ok(())
        } else {
            Err(Error::FeatureUnsupported(Feature::VertexBufferObjects))
        }
    }

    pub(crate) fn upload_all(&mut self, device: &mut dyn GraphicsDevice) {
        for buffer in self.buffers.values_mut() {
            buffer.upload(device);
        }
        self.is_static = true;
        tracing::debug!(buffers = self.buffers.len(), "batch made static");
    }
}
