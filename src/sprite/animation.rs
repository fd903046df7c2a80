use crate::texture::TextureRegion;

/// The frames of a sprite sheet laid out as a grid of equally sized cells.
///
/// Frames are numbered left-to-right, top-to-bottom. Each frame is the
/// [`TextureRegion`] of one cell, ready for [`Sprite::set_region`](crate::Sprite::set_region).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteAnimation {
    rows: u32,
    columns: u32,
    frames: Vec<TextureRegion>,
}

impl SpriteAnimation {
    /// Divides a texture into `rows` by `columns` frames. A zero dimension
    /// produces an animation without frames.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        let mut frames = Vec::with_capacity(rows as usize * columns as usize);
        for y in 0..rows {
            for x in 0..columns {
                frames.push(TextureRegion::from_components(
                    x as f32 / columns as f32,
                    y as f32 / rows as f32,
                    (x + 1) as f32 / columns as f32,
                    (y + 1) as f32 / rows as f32,
                ));
            }
        }

        Self {
            rows,
            columns,
            frames,
        }
    }

    /// The number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// The number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// The number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if there are no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Every frame in order.
    #[must_use]
    pub fn frames(&self) -> &[TextureRegion] {
        &self.frames
    }

    /// Returns frame `index`, or the full texture if `index` is out of range.
    #[must_use]
    pub fn key_frame(&self, index: usize) -> TextureRegion {
        self.frames.get(index).copied().unwrap_or_else(|| {
            tracing::warn!(index, len = self.frames.len(), "key frame out of range");
            TextureRegion::full()
        })
    }
}

#[cfg(test)]
mod tests {
    use image::RgbaImage;

    use super::*;
    use crate::{math::Size, Sprite, Texture};

    #[test]
    fn frames_read_left_to_right_top_to_bottom() {
        let animation = SpriteAnimation::new(2, 4);
        assert_eq!(animation.len(), 8);
        assert_eq!((animation.rows(), animation.columns()), (2, 4));
        assert_eq!(
            animation.key_frame(0),
            TextureRegion::from_components(0., 0., 0.25, 0.5)
        );
        assert_eq!(
            animation.key_frame(1),
            TextureRegion::from_components(0.25, 0., 0.5, 0.5)
        );
        assert_eq!(
            animation.key_frame(5),
            TextureRegion::from_components(0.25, 0.5, 0.5, 1.)
        );
        assert_eq!(
            animation.key_frame(7),
            TextureRegion::from_components(0.75, 0.5, 1., 1.)
        );
    }

    #[test]
    fn out_of_range_is_full_texture() {
        let animation = SpriteAnimation::new(1, 3);
        assert_eq!(animation.key_frame(3), TextureRegion::full());
        assert_eq!(animation.key_frame(usize::MAX), TextureRegion::full());

        let empty = SpriteAnimation::new(0, 5);
        assert!(empty.is_empty());
        assert_eq!(empty.key_frame(0), TextureRegion::full());
    }

    #[test]
    fn frame_sizes_a_sprite() {
        let texture = Texture::from_rgba(RgbaImage::new(64, 32));
        let animation = SpriteAnimation::new(2, 4);
        let mut sprite = Sprite::new(&texture);
        sprite.set_region(animation.key_frame(6), true);
        assert_eq!(sprite.size(), Size::new(16., 16.));
        assert_eq!(*sprite.region(), animation.frames()[6]);
    }
}
