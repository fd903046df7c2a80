//! Batched sprite and shape rendering.
//!
//! Geometry is collected into a [`Batch`], grouped by texture, and drawn with
//! one call per texture through a [`GraphicsDevice`](device::GraphicsDevice).
//! Batches that rarely change can be made static, moving their geometry into
//! buffer objects owned by the device.

#![forbid(unsafe_code)]
#![warn(
    clippy::cargo,
    missing_docs,
    clippy::nursery,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms,
)]
#![cfg_attr(doc, deny(rustdoc::all))]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
)]

/// Packs images into a single texture.
pub mod atlas;
/// Per-texture geometry buffers and the draw loop over them.
pub mod batch;
mod color;
pub mod device;
mod error;
/// A [`GraphicsDevice`](device::GraphicsDevice) that records instead of
/// rendering.
pub mod headless;
/// Math types for 2d geometry.
pub mod math;
pub mod pack;
pub mod script;
/// Shader handles and blend states.
pub mod shader;
/// Filled rectangles, circles and polygons.
pub mod shape;
/// Types for rendering sprites.
pub mod sprite;
#[cfg(test)]
mod tests;
/// Types for managing textures.
pub mod texture;
/// The vertex layout shared by every batch.
pub mod vertex;

// Re-exports
pub use euclid;
pub use image;
pub use lazy_static;

pub use self::{
    atlas::TextureAtlas,
    batch::Batch,
    color::Color,
    error::Error,
    headless::HeadlessDevice,
    pack::RectanglePacker,
    shader::{BlendState, Shader},
    shape::Shape,
    sprite::{SharedSprite, Sprite, SpriteAnimation, SpriteBatch},
    texture::{Texture, TextureRegion},
    vertex::Vertex,
};

/// A collection of commonly used exports provided by this crate.
pub mod prelude {
    pub use super::{
        device::{Feature, GraphicsDevice},
        include_texture,
        math::{ortho, Angle, Point, Rect, Size, Vector},
        Batch, BlendState, Color, HeadlessDevice, Shader, Shape, SharedSprite, Sprite,
        SpriteAnimation, SpriteBatch, Texture, TextureAtlas, TextureRegion, Vertex,
    };
}

/// Alias for [`std::result::Result`] where the error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
