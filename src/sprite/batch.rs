use std::{collections::BTreeSet, ops::Deref};

use crate::{
    device::GraphicsDevice, math::Projection, sprite::SharedSprite, texture::TextureId, Batch,
    BlendState, Shader, Texture,
};

/// Where a sprite's quad was placed when its batch was made static.
#[derive(Debug, Clone, Copy)]
struct Placement {
    texture: Option<TextureId>,
    offset: usize,
}

/// A [`Batch`] built from shared sprites.
///
/// While dynamic, every draw rebuilds the batch from the current state of all
/// sprites. After [`SpriteBatch::make_static`], only sprites retrieved through
/// [`SpriteBatch::get`] since the previous draw are regenerated, and only
/// their four vertices are sent to the device.
#[derive(Debug, Default)]
pub struct SpriteBatch {
    batch: Batch,
    sprites: Vec<SharedSprite>,
    placements: Vec<Option<Placement>>,
    checked_out: BTreeSet<usize>,
}

impl Deref for SpriteBatch {
    type Target = Batch;

    fn deref(&self) -> &Batch {
        &self.batch
    }
}

impl SpriteBatch {
    /// Returns an empty sprite batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `sprite`. Ignored while the batch is static.
    pub fn add(&mut self, sprite: SharedSprite) {
        if self.batch.is_static() {
            tracing::warn!(sprite = ?sprite.id(), "cannot add sprites to a static sprite batch");
            return;
        }

        self.sprites.push(sprite);
    }

    /// Returns the sprite at `index`. If the batch is static, the sprite's
    /// quad is regenerated on the next draw.
    pub fn get(&mut self, index: usize) -> Option<SharedSprite> {
        match self.sprites.get(index) {
            Some(sprite) => {
                self.checked_out.insert(index);
                Some(sprite.clone())
            }
            None => {
                tracing::error!(index, len = self.sprites.len(), "SpriteBatch::get: index out of bounds");
                None
            }
        }
    }

    /// The sprites in insertion order.
    #[must_use]
    pub fn sprites(&self) -> &[SharedSprite] {
        &self.sprites
    }

    /// The number of sprites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Returns true if there are no sprites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Sets the projection matrix of the underlying batch.
    pub fn set_projection_matrix(&mut self, projection: Projection) {
        self.batch.set_projection_matrix(projection);
    }

    /// Sets the shader of the underlying batch.
    pub fn set_shader(&mut self, shader: Option<&Shader>) {
        self.batch.set_shader(shader);
    }

    /// Sets the blend state of the underlying batch.
    pub fn set_blend_state(&mut self, blend: BlendState) {
        self.batch.set_blend_state(blend);
    }

    /// Draws every sprite.
    pub fn draw(&mut self, device: &mut dyn GraphicsDevice) {
        if self.batch.is_static() {
            self.refresh_checked_out();
        } else {
            self.rebuild();
        }

        self.batch.draw(device);
    }

    /// Submits every sprite and uploads the result to buffer objects.
    ///
    /// Returns [`Error::FeatureUnsupported`](crate::Error::FeatureUnsupported)
    /// without changing the batch if `device` has no buffer objects.
    pub fn make_static(&mut self, device: &mut dyn GraphicsDevice) -> crate::Result<()> {
        Batch::require_buffer_objects(device)?;
        if self.batch.is_static() {
            return Ok(());
        }

        self.batch.clear();
        self.placements.clear();
        for (slot, shared) in self.sprites.iter().enumerate() {
            let sprite = match shared.try_read() {
                Some(sprite) => sprite,
                None => {
                    tracing::error!(slot, sprite = ?shared.id(), "sprite is locked for writing; leaving it out of the static batch");
                    self.placements.push(None);
                    continue;
                }
            };
            let texture = sprite.texture().map(Texture::id);
            let offset = self
                .batch
                .buffer_mut(texture)
                .map_or(0, |buffer| buffer.vertices().len());
            self.placements.push(Some(Placement { texture, offset }));
            sprite.draw(&mut self.batch);
        }
        self.checked_out.clear();

        self.batch.upload_all(device);
        Ok(())
    }

    /// Removes every sprite and returns the batch to the dynamic state.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.placements.clear();
        self.checked_out.clear();
        self.batch.clear();
        self.batch.set_texture(None);
    }

    fn rebuild(&mut self) {
        self.batch.clear();
        for (slot, shared) in self.sprites.iter().enumerate() {
            match shared.try_read() {
                Some(sprite) => sprite.draw(&mut self.batch),
                None => {
                    tracing::error!(slot, sprite = ?shared.id(), "sprite is locked for writing; skipping it this frame");
                }
            }
        }
        self.checked_out.clear();
    }

    fn refresh_checked_out(&mut self) {
        let mut still_locked = BTreeSet::new();
        for slot in std::mem::take(&mut self.checked_out) {
            let (shared, placement) = match (self.sprites.get(slot), self.placements.get(slot)) {
                (Some(shared), Some(Some(placement))) => (shared, *placement),
                _ => continue,
            };
            let sprite = match shared.try_read() {
                Some(sprite) => sprite,
                None => {
                    tracing::error!(slot, sprite = ?shared.id(), "sprite is locked for writing; refreshing it on a later draw");
                    still_locked.insert(slot);
                    continue;
                }
            };

            if sprite.texture().map(Texture::id) != placement.texture {
                tracing::warn!(
                    slot,
                    "texture changed after the sprite batch was made static; keeping the original"
                );
            }

            let (vertices, _) = sprite.quad();
            let updated = self
                .batch
                .buffer_mut(placement.texture)
                .map_or(false, |buffer| buffer.overwrite(placement.offset, &vertices));
            if updated {
                tracing::trace!(slot, offset = placement.offset, "refreshed static sprite");
            } else {
                tracing::error!(slot, "static sprite placement is out of bounds");
            }
        }
        self.checked_out = still_locked;
    }
}
