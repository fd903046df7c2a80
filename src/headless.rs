use std::{
    collections::HashSet,
    sync::{Arc, PoisonError, RwLock},
};

use generational_arena::{Arena, Index};

use crate::{
    device::{
        BufferId, DrawCall, Feature, GraphicsDevice, PrimitiveType, VertexBufferObject,
        VertexSource,
    },
    math::Projection,
    shader::ShaderId,
    texture::TextureId,
    BlendState, Vertex,
};

/// A [`GraphicsDevice`] that keeps buffer objects in memory and records every
/// draw call instead of rasterizing. Used for offscreen validation of batches
/// and in tests.
#[derive(Debug)]
pub struct HeadlessDevice {
    features: HashSet<Feature>,
    storage: Arc<RwLock<Storage>>,
    draws: Vec<RecordedDraw>,
}

#[derive(Debug)]
struct Storage {
    buffers: Arena<BufferStorage>,
    next_id: u64,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            buffers: Arena::new(),
            next_id: 0,
        }
    }
}

impl Storage {
    fn find(&self, id: BufferId) -> Option<&BufferStorage> {
        self.buffers
            .iter()
            .map(|(_, buffer)| buffer)
            .find(|buffer| buffer.id == id)
    }
}

#[derive(Debug)]
struct BufferStorage {
    id: BufferId,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    full_uploads: usize,
    partial_uploads: Vec<(usize, usize)>,
}

/// A draw call captured by a [`HeadlessDevice`], with its geometry resolved
/// from whichever source it was submitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    /// How indices were assembled into primitives.
    pub primitive: PrimitiveType,
    /// The vertices available to the draw.
    pub vertices: Vec<Vertex>,
    /// The indices drawn.
    pub indices: Vec<u32>,
    /// The buffer object drawn from, if the geometry was GPU-resident.
    pub buffer: Option<BufferId>,
    /// The texture bound for the draw.
    pub texture: Option<TextureId>,
    /// The shader bound for the draw.
    pub shader: Option<ShaderId>,
    /// The blend state used.
    pub blend: BlendState,
    /// The projection matrix used.
    pub projection: Projection,
}

impl RecordedDraw {
    /// Returns the vertices in the order the indices reference them.
    #[must_use]
    pub fn resolved_vertices(&self) -> Vec<Vertex> {
        self.indices
            .iter()
            .filter_map(|&index| self.vertices.get(index as usize).copied())
            .collect()
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    /// Returns a device supporting every [`Feature`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            features: [Feature::VertexBufferObjects, Feature::FrameBufferObjects]
                .iter()
                .copied()
                .collect(),
            storage: Arc::default(),
            draws: Vec::new(),
        }
    }

    /// Returns a device that cannot create buffer objects.
    #[must_use]
    pub fn without_buffer_objects() -> Self {
        Self::new().with_feature(Feature::VertexBufferObjects, false)
    }

    /// Builder-style function. Enables or disables `feature`.
    #[must_use]
    pub fn with_feature(mut self, feature: Feature, enabled: bool) -> Self {
        if enabled {
            self.features.insert(feature);
        } else {
            self.features.remove(&feature);
        }
        self
    }

    /// Returns every draw recorded since the last [`Self::take_draws`].
    #[must_use]
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Removes and returns the recorded draws.
    pub fn take_draws(&mut self) -> Vec<RecordedDraw> {
        std::mem::take(&mut self.draws)
    }

    /// Returns the number of buffer objects that have not been dropped.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.storage().buffers.len()
    }

    /// Returns the current contents of buffer `id`.
    #[must_use]
    pub fn buffer_vertices(&self, id: BufferId) -> Option<Vec<Vertex>> {
        self.storage().find(id).map(|buffer| buffer.vertices.clone())
    }

    /// Returns the indices uploaded to buffer `id`.
    #[must_use]
    pub fn buffer_indices(&self, id: BufferId) -> Option<Vec<u32>> {
        self.storage().find(id).map(|buffer| buffer.indices.clone())
    }

    /// Returns how many full uploads buffer `id` has received.
    #[must_use]
    pub fn full_uploads(&self, id: BufferId) -> Option<usize> {
        self.storage().find(id).map(|buffer| buffer.full_uploads)
    }

    /// Returns the `(offset, count)` of every partial upload buffer `id` has
    /// received.
    #[must_use]
    pub fn partial_uploads(&self, id: BufferId) -> Option<Vec<(usize, usize)>> {
        self.storage()
            .find(id)
            .map(|buffer| buffer.partial_uploads.clone())
    }

    fn storage(&self) -> std::sync::RwLockReadGuard<'_, Storage> {
        self.storage
            .read()
            .map_or_else(PoisonError::into_inner, |g| g)
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn is_supported(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    fn create_vertex_buffer(&mut self) -> Box<dyn VertexBufferObject> {
        let mut storage = self
            .storage
            .write()
            .map_or_else(PoisonError::into_inner, |g| g);
        let id = BufferId(storage.next_id);
        storage.next_id += 1;
        let index = storage.buffers.insert(BufferStorage {
            id,
            vertices: Vec::new(),
            indices: Vec::new(),
            full_uploads: 0,
            partial_uploads: Vec::new(),
        });
        tracing::trace!(?id, "created headless buffer object");
        Box::new(HeadlessBuffer {
            id,
            index,
            storage: self.storage.clone(),
        })
    }

    fn draw_indexed(&mut self, call: &DrawCall<'_>) {
        let (vertices, indices, buffer) = match call.source {
            VertexSource::Arrays { vertices, indices } =>
                (vertices.to_vec(), indices.to_vec(), None),
            VertexSource::Buffer(buffer) => {
                let storage = self.storage();
                let (vertices, indices) = storage
                    .find(buffer.id())
                    .map(|stored| (stored.vertices.clone(), stored.indices.clone()))
                    .unwrap_or_default();
                (vertices, indices, Some(buffer.id()))
            }
        };

        self.draws.push(RecordedDraw {
            primitive: call.primitive,
            vertices,
            indices,
            buffer,
            texture: call.texture.map(crate::Texture::id),
            shader: call.shader.map(crate::Shader::id),
            blend: call.blend,
            projection: *call.projection,
        });
    }
}

#[derive(Debug)]
struct HeadlessBuffer {
    id: BufferId,
    index: Index,
    storage: Arc<RwLock<Storage>>,
}

impl HeadlessBuffer {
    fn with_storage<R>(&self, f: impl FnOnce(&mut BufferStorage) -> R) -> Option<R> {
        let mut storage = self
            .storage
            .write()
            .map_or_else(PoisonError::into_inner, |g| g);
        storage.buffers.get_mut(self.index).map(f)
    }
}

impl VertexBufferObject for HeadlessBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn upload(&mut self, vertices: &[Vertex], indices: &[u32]) {
        self.with_storage(|buffer| {
            buffer.vertices = vertices.to_vec();
            buffer.indices = indices.to_vec();
            buffer.full_uploads += 1;
        });
    }

    fn upload_sub(&mut self, offset: usize, vertices: &[Vertex]) {
        let id = self.id;
        self.with_storage(|buffer| {
            let end = match offset
                .checked_add(vertices.len())
                .filter(|&end| end <= buffer.vertices.len())
            {
                Some(end) => end,
                None => {
                    tracing::error!(
                        ?id,
                        offset,
                        count = vertices.len(),
                        "partial upload outside of buffer bounds"
                    );
                    return;
                }
            };
            buffer.vertices[offset..end].copy_from_slice(vertices);
            buffer.partial_uploads.push((offset, vertices.len()));
        });
    }

    fn index_count(&self) -> usize {
        self.with_storage(|buffer| buffer.indices.len())
            .unwrap_or_default()
    }
}

impl Drop for HeadlessBuffer {
    fn drop(&mut self) {
        let mut storage = self
            .storage
            .write()
            .map_or_else(PoisonError::into_inner, |g| g);
        storage.buffers.remove(self.index);
    }
}
