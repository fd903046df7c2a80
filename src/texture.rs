use std::{
    convert::TryFrom,
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use derivative::Derivative;
use image::{DynamicImage, RgbaImage};
use lazy_static::lazy_static;

use crate::math::{Point, Size};

lazy_static! {
    static ref GLOBAL_ID_CELL: AtomicU64 = AtomicU64::new(0);
}

/// Embeds a texture in the binary.
#[macro_export]
macro_rules! include_texture {
    ($image_path:expr) => {{
        let image_bytes = std::include_bytes!($image_path);
        <$crate::texture::Texture as std::convert::TryFrom<&[u8]>>::try_from(image_bytes)
    }};
}

/// A stable identity for a [`Texture`], used to key per-texture buffers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureId(u64);

impl TextureId {
    fn new_unique_id() -> Self {
        Self(GLOBAL_ID_CELL.fetch_add(1, Ordering::SeqCst))
    }
}

/// An image that can be drawn through a batch. Cheap to clone: every clone
/// holds a reference to the same pixel data, and the data is released when
/// the last clone is dropped.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Texture {
    id: TextureId,
    /// The image behind the texture.
    #[derivative(Debug = "ignore")]
    pub image: Arc<RgbaImage>,
}

impl Texture {
    /// The unique ID of this texture. This depends on load order and is not
    /// related to the image data in any way.
    #[must_use]
    pub const fn id(&self) -> TextureId {
        self.id
    }

    /// Creates a new texture from an image.
    #[must_use]
    pub fn new(image: &DynamicImage) -> Self {
        Self::from_rgba(image.to_rgba8())
    }

    /// Creates a new texture that takes ownership of `image`.
    #[must_use]
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            id: TextureId::new_unique_id(),
            image: Arc::new(image),
        }
    }

    /// Loads a texture from an image at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let img = image::open(path)?;

        Ok(Self::new(&img))
    }

    /// Returns the width of the image in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Returns the height of the image in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns the size of the image.
    #[must_use]
    pub fn size(&self) -> Size<u32> {
        let (w, h) = self.image.dimensions();
        Size::new(w, h)
    }

    /// Returns the number of live references to this texture's data.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.image)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<'a> TryFrom<&'a [u8]> for Texture {
    type Error = crate::Error;

    fn try_from(bytes: &[u8]) -> crate::Result<Self> {
        let img = image::load_from_memory(bytes)?;

        Ok(Self::new(&img))
    }
}

/// A rectangular area of a texture expressed in texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureRegion {
    /// The top-left texture coordinate.
    pub uv0: Point,
    /// The bottom-right texture coordinate.
    pub uv1: Point,
}

impl Default for TextureRegion {
    fn default() -> Self {
        Self::full()
    }
}

impl TextureRegion {
    /// A region covering the whole texture.
    #[must_use]
    pub fn full() -> Self {
        Self::from_components(0., 0., 1., 1.)
    }

    /// Returns a region spanning `uv0` to `uv1`.
    #[must_use]
    pub const fn new(uv0: Point, uv1: Point) -> Self {
        Self { uv0, uv1 }
    }

    /// Returns a region spanning `(u0, v0)` to `(u1, v1)`.
    #[must_use]
    pub fn from_components(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self::new(Point::new(u0, v0), Point::new(u1, v1))
    }

    /// Returns a region covering `area` of a texture sized `texture_size`.
    #[must_use]
    pub fn from_pixels(area: crate::math::Rect<u32>, texture_size: Size<u32>) -> Self {
        let width = texture_size.width as f32;
        let height = texture_size.height as f32;
        let max = area.max();
        Self::from_components(
            area.origin.x as f32 / width,
            area.origin.y as f32 / height,
            max.x as f32 / width,
            max.y as f32 / height,
        )
    }

    /// Replaces both corners.
    pub fn set_region(&mut self, uv0: Point, uv1: Point) {
        self.uv0 = uv0;
        self.uv1 = uv1;
    }

    /// Returns the size in pixels this region covers of `texture`. Partial
    /// pixels are truncated.
    #[must_use]
    pub fn size_in(&self, texture: &Texture) -> Size<u32> {
        let width = texture.width() as f32;
        let height = texture.height() as f32;
        Size::new(
            truncate(width.mul_add(self.uv1.x, -(width * self.uv0.x))),
            truncate(height.mul_add(self.uv1.y, -(height * self.uv0.y))),
        )
    }
}

#[allow(clippy::cast_sign_loss)]
fn truncate(value: f32) -> u32 {
    value.max(0.) as u32
}
