use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError,
};

use lazy_static::lazy_static;

use crate::{
    math::{Angle, Point, Size, Transform, Vector},
    texture::TextureRegion,
    vertex::{QUAD_INDICES, QUAD_VERTICES},
    Batch, Color, Texture, Vertex,
};

mod animation;
mod batch;

pub use self::{animation::SpriteAnimation, batch::SpriteBatch};

lazy_static! {
    static ref GLOBAL_ID_CELL: AtomicU64 = AtomicU64::new(0);
}

/// A textured, colored quad with a 2d transform.
///
/// The quad spans `size` pixels. It is scaled and rotated around `origin`,
/// which is relative to the quad's top-left corner, and then placed so that
/// the top-left corner of the unrotated quad is at `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    texture: Option<Texture>,
    region: TextureRegion,
    position: Point,
    size: Size,
    origin: Vector,
    rotation: Angle,
    scale: Vector,
    color: Color,
    depth: f32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: None,
            region: TextureRegion::full(),
            position: Point::zero(),
            size: Size::zero(),
            origin: Vector::zero(),
            rotation: Angle::zero(),
            scale: Vector::new(1., 1.),
            color: Color::WHITE,
            depth: 0.,
        }
    }
}

impl Sprite {
    /// Returns a sprite showing all of `texture` at its native size.
    #[must_use]
    pub fn new(texture: &Texture) -> Self {
        let size = texture.size();
        Self {
            texture: Some(texture.clone()),
            size: Size::new(size.width as f32, size.height as f32),
            ..Self::default()
        }
    }

    /// Builder-style function. Sets the position and returns self.
    #[must_use]
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Builder-style function. Sets the size and returns self.
    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Builder-style function. Sets the origin and returns self.
    #[must_use]
    pub fn with_origin(mut self, origin: Vector) -> Self {
        self.origin = origin;
        self
    }

    /// Builder-style function. Sets the rotation and returns self.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Angle) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder-style function. Sets the color and returns self.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Builder-style function. Sets the texture region and returns self.
    #[must_use]
    pub fn with_region(mut self, region: TextureRegion) -> Self {
        self.region = region;
        self
    }

    /// The texture drawn on the quad.
    #[must_use]
    pub const fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    /// Replaces the texture, keeping the current region and size.
    pub fn set_texture(&mut self, texture: Option<&Texture>) {
        self.texture = texture.cloned();
    }

    /// The area of the texture drawn on the quad.
    #[must_use]
    pub const fn region(&self) -> &TextureRegion {
        &self.region
    }

    /// Replaces the texture region. When `resize` is true, the size becomes
    /// the region's size in pixels, or zero if there is no texture.
    pub fn set_region(&mut self, region: TextureRegion, resize: bool) {
        self.region = region;
        if resize {
            self.size = self.texture.as_ref().map_or_else(Size::zero, |texture| {
                let pixels = region.size_in(texture);
                Size::new(pixels.width as f32, pixels.height as f32)
            });
        }
    }

    /// The location of the top-left corner of the unrotated quad.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Moves the sprite to `position`.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// The horizontal component of [`Self::position`].
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.position.x
    }

    /// Sets the horizontal component of the position.
    pub fn set_x(&mut self, x: f32) {
        self.position.x = x;
    }

    /// The vertical component of [`Self::position`].
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.position.y
    }

    /// Sets the vertical component of the position.
    pub fn set_y(&mut self, y: f32) {
        self.position.y = y;
    }

    /// Offsets the position by `delta`.
    pub fn move_by(&mut self, delta: Vector) {
        self.position += delta;
    }

    /// The size of the quad before scaling.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Sets the size of the quad before scaling.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// The width of the quad before scaling.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.size.width
    }

    /// Sets the width of the quad before scaling.
    pub fn set_width(&mut self, width: f32) {
        self.size.width = width;
    }

    /// The height of the quad before scaling.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.size.height
    }

    /// Sets the height of the quad before scaling.
    pub fn set_height(&mut self, height: f32) {
        self.size.height = height;
    }

    /// Multiplies the size by `x` and `y`.
    pub fn scale_size(&mut self, x: f32, y: f32) {
        self.size.width *= x;
        self.size.height *= y;
    }

    /// The point scaling and rotation happen around, relative to the top-left
    /// corner.
    #[must_use]
    pub const fn origin(&self) -> Vector {
        self.origin
    }

    /// Sets the point scaling and rotation happen around.
    pub fn set_origin(&mut self, origin: Vector) {
        self.origin = origin;
    }

    /// The rotation around the origin.
    #[must_use]
    pub const fn rotation(&self) -> Angle {
        self.rotation
    }

    /// Sets the rotation around the origin.
    pub fn set_rotation(&mut self, rotation: Angle) {
        self.rotation = rotation;
    }

    /// Adds `angle` to the rotation.
    pub fn rotate(&mut self, angle: Angle) {
        self.rotation += angle;
    }

    /// The per-axis scale applied around the origin.
    #[must_use]
    pub const fn scale(&self) -> Vector {
        self.scale
    }

    /// Sets the per-axis scale applied around the origin.
    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = Vector::new(x, y);
    }

    /// The color of every vertex.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Sets the color of every vertex.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// The layer this sprite belongs to.
    #[must_use]
    pub const fn depth(&self) -> f32 {
        self.depth
    }

    /// Sets the layer this sprite belongs to.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
    }

    /// The center of the unrotated, unscaled quad.
    #[must_use]
    pub fn center(&self) -> Point {
        self.position + self.size.to_vector() / 2.
    }

    /// The transformation from unit quad coordinates to pixels.
    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::scale(self.size.width, self.size.height)
            .then_translate(-self.origin)
            .then_scale(self.scale.x, self.scale.y)
            .then_rotate(self.rotation)
            .then_translate(self.position.to_vector() + self.origin)
    }

    /// Returns the four transformed corners, in vertex order.
    #[must_use]
    pub fn aabb(&self) -> [Point; 4] {
        let transform = self.transform();
        let mut corners = [Point::zero(); 4];
        for (corner, unit) in corners.iter_mut().zip(QUAD_VERTICES.iter()) {
            *corner = transform.transform_point(Point::from(*unit));
        }
        corners
    }

    /// Writes the quad into `vertices` and `indices`, adding `index_offset` to
    /// every index.
    pub fn vertices(&self, vertices: &mut [Vertex; 4], indices: &mut [u32; 6], index_offset: u32) {
        let corners = self.aabb();
        let TextureRegion { uv0, uv1 } = self.region;
        let tex_coords = [[uv0.x, uv1.y], [uv1.x, uv1.y], [uv1.x, uv0.y], [uv0.x, uv0.y]];
        for ((vertex, corner), tex_coord) in vertices.iter_mut().zip(corners).zip(tex_coords) {
            *vertex = Vertex::new(corner, self.color, tex_coord);
        }
        for (index, quad_index) in indices.iter_mut().zip(QUAD_INDICES) {
            *index = quad_index + index_offset;
        }
    }

    /// Returns the quad's vertices with indices starting at 0.
    #[must_use]
    pub fn quad(&self) -> ([Vertex; 4], [u32; 6]) {
        let mut vertices = [Vertex::default(); 4];
        let mut indices = [0; 6];
        self.vertices(&mut vertices, &mut indices, 0);
        (vertices, indices)
    }

    /// Selects this sprite's texture on `batch` and submits the quad.
    pub fn draw(&self, batch: &mut Batch) {
        let (vertices, indices) = self.quad();
        batch.set_texture(self.texture.as_ref());
        batch.add_vertices(&vertices, &indices);
    }
}

/// A stable identity for a [`SharedSprite`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SpriteId(u64);

/// A [`Sprite`] that can be held by several owners at once, such as a
/// [`SpriteBatch`] and the code animating it. Cloning is cheap and every
/// clone refers to the same sprite.
#[derive(Debug, Clone)]
pub struct SharedSprite {
    id: SpriteId,
    data: Arc<RwLock<Sprite>>,
}

impl From<Sprite> for SharedSprite {
    fn from(sprite: Sprite) -> Self {
        Self::new(sprite)
    }
}

impl SharedSprite {
    /// Wraps `sprite` for sharing.
    #[must_use]
    pub fn new(sprite: Sprite) -> Self {
        Self {
            id: SpriteId(GLOBAL_ID_CELL.fetch_add(1, Ordering::SeqCst)),
            data: Arc::new(RwLock::new(sprite)),
        }
    }

    /// The unique ID shared by every clone of this handle.
    #[must_use]
    pub const fn id(&self) -> SpriteId {
        self.id
    }

    /// Locks the sprite for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Sprite> {
        self.data.read().map_or_else(PoisonError::into_inner, |g| g)
    }

    /// Locks the sprite for reading, returning `None` instead of blocking if
    /// a write guard is alive.
    #[must_use]
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, Sprite>> {
        match self.data.try_read() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Locks the sprite for writing.
    ///
    /// The guard must be dropped before a [`SpriteBatch`] holding this sprite
    /// is drawn or made static. The batch skips sprites it cannot read and
    /// logs an error.
    pub fn write(&self) -> RwLockWriteGuard<'_, Sprite> {
        self.data.write().map_or_else(PoisonError::into_inner, |g| g)
    }

    /// Returns the number of live handles to this sprite.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }
}

impl PartialEq for SharedSprite {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use image::RgbaImage;

    use super::*;

    fn texture(width: u32, height: u32) -> Texture {
        Texture::from_rgba(RgbaImage::new(width, height))
    }

    fn assert_point_eq(actual: Point, expected: (f32, f32)) {
        assert_relative_eq!(actual.x, expected.0, epsilon = 1e-4);
        assert_relative_eq!(actual.y, expected.1, epsilon = 1e-4);
    }

    #[test]
    fn identity_corners() {
        let sprite = Sprite::default().with_size(Size::new(32., 16.));
        let corners = sprite.aabb();
        assert_point_eq(corners[0], (0., 0.));
        assert_point_eq(corners[1], (32., 0.));
        assert_point_eq(corners[2], (32., 16.));
        assert_point_eq(corners[3], (0., 16.));
    }

    #[test]
    fn rotates_around_origin() {
        let sprite = Sprite::default()
            .with_size(Size::new(2., 2.))
            .with_origin(Vector::new(1., 1.))
            .with_rotation(Angle::degrees(90.));
        let corners = sprite.aabb();
        assert_point_eq(corners[0], (2., 0.));
        assert_point_eq(corners[1], (2., 2.));
        assert_point_eq(corners[2], (0., 2.));
        assert_point_eq(corners[3], (0., 0.));
    }

    #[test]
    fn scales_around_origin() {
        let mut sprite = Sprite::default()
            .with_position(Point::new(10., 10.))
            .with_size(Size::new(4., 4.))
            .with_origin(Vector::new(2., 2.));
        sprite.set_scale(2., 0.5);
        let corners = sprite.aabb();
        assert_point_eq(corners[0], (8., 11.));
        assert_point_eq(corners[2], (16., 13.));
    }

    #[test]
    fn quad_layout() {
        let sprite = Sprite::default()
            .with_size(Size::new(1., 1.))
            .with_color(Color::RED)
            .with_region(TextureRegion::from_components(0.25, 0.5, 0.75, 1.));
        let mut vertices = [Vertex::default(); 4];
        let mut indices = [0; 6];
        sprite.vertices(&mut vertices, &mut indices, 8);

        assert_eq!(indices, [8, 9, 10, 8, 10, 11]);
        assert_eq!(vertices[0].tex_coord, [0.25, 1.]);
        assert_eq!(vertices[1].tex_coord, [0.75, 1.]);
        assert_eq!(vertices[2].tex_coord, [0.75, 0.5]);
        assert_eq!(vertices[3].tex_coord, [0.25, 0.5]);
        assert!(vertices.iter().all(|v| v.color == [255, 0, 0, 255]));
    }

    #[test]
    fn region_resize() {
        let texture = texture(64, 64);
        let mut sprite = Sprite::new(&texture);
        assert_eq!(sprite.size(), Size::new(64., 64.));
        sprite.set_region(TextureRegion::from_components(0., 0., 0.5, 0.25), true);
        assert_eq!(sprite.size(), Size::new(32., 16.));
        sprite.set_region(TextureRegion::full(), false);
        assert_eq!(sprite.size(), Size::new(32., 16.));

        let mut untextured = Sprite::default().with_size(Size::new(5., 5.));
        untextured.set_region(TextureRegion::full(), true);
        assert_eq!(untextured.size(), Size::zero());
    }

    #[test]
    fn helpers() {
        let mut sprite = Sprite::default().with_size(Size::new(10., 20.));
        sprite.move_by(Vector::new(5., 5.));
        sprite.set_x(7.);
        assert_eq!(sprite.position(), Point::new(7., 5.));
        assert_eq!(sprite.center(), Point::new(12., 15.));
        sprite.scale_size(2., 0.5);
        assert_eq!(sprite.size(), Size::new(20., 10.));
        sprite.rotate(Angle::degrees(30.));
        sprite.rotate(Angle::degrees(60.));
        assert_relative_eq!(sprite.rotation().to_degrees(), 90., epsilon = 1e-4);
    }

    #[test]
    fn draw_selects_texture() {
        let texture = texture(8, 8);
        let sprite = Sprite::new(&texture);
        let mut batch = Batch::new();
        sprite.draw(&mut batch);
        assert_eq!(batch.texture(), Some(&texture));
        let buffer = batch.buffer(Some(&texture)).unwrap();
        assert_eq!(buffer.vertices().len(), 4);
        assert_eq!(buffer.indices(), &QUAD_INDICES);
    }

    #[test]
    fn shared_handles() {
        let shared = SharedSprite::new(Sprite::default());
        let other = shared.clone();
        assert_eq!(shared.reference_count(), 2);
        other.write().set_x(3.);
        assert_eq!(shared.read().x(), 3.);
        assert_eq!(shared, other);
        assert_ne!(shared, SharedSprite::new(Sprite::default()));
    }

    #[test]
    fn try_read_while_written() {
        let shared = SharedSprite::new(Sprite::default());
        let guard = shared.write();
        assert!(shared.try_read().is_none());
        drop(guard);
        assert!(shared.try_read().is_some());
    }
}
