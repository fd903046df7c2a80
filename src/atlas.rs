use std::{collections::HashMap, hash::Hash};

use image::{GenericImage, RgbaImage};

use crate::{pack::RectanglePacker, texture::TextureRegion, Error, Texture};

/// Multiple images combined into a single [`Texture`]. This type is often
/// called a sprite sheet.
///
/// Drawing several images from one atlas lets a [`Batch`](crate::Batch) draw
/// all of them with a single call, since they share a texture.
#[derive(Debug, Clone)]
pub struct TextureAtlas<K> {
    texture: Texture,
    regions: HashMap<K, TextureRegion>,
}

impl<K: Eq + Hash> TextureAtlas<K> {
    /// Packs `images` into a canvas no wider than `max_width` and creates a
    /// texture from the result.
    ///
    /// Returns [`Error::AtlasPacking`] if there are no images or an image is
    /// wider than `max_width`.
    pub fn build<I>(images: I, max_width: u32) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (K, RgbaImage)>,
    {
        let images = images.into_iter().collect::<Vec<_>>();
        let mut packer = RectanglePacker::new(max_width);
        for (index, (_, image)) in images.iter().enumerate() {
            packer.add_rect(image.width(), image.height(), index);
        }
        let packing = packer.pack().ok_or(Error::AtlasPacking)?;

        let mut canvas = RgbaImage::new(packing.canvas.width, packing.canvas.height);
        let mut areas = vec![None; images.len()];
        for packed in &packing.rectangles {
            canvas.copy_from(&images[packed.data].1, packed.area.origin.x, packed.area.origin.y)?;
            areas[packed.data] = Some(packed.area);
        }

        let regions = images
            .into_iter()
            .zip(areas)
            .filter_map(|((key, _), area)| {
                area.map(|area| (key, TextureRegion::from_pixels(area, packing.canvas)))
            })
            .collect::<HashMap<_, _>>();
        tracing::debug!(
            images = regions.len(),
            width = packing.canvas.width,
            height = packing.canvas.height,
            "built texture atlas"
        );

        Ok(Self {
            texture: Texture::from_rgba(canvas),
            regions,
        })
    }

    /// The texture every region refers to.
    #[must_use]
    pub const fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Returns the region the image added as `key` occupies.
    #[must_use]
    pub fn region(&self, key: &K) -> Option<TextureRegion> {
        self.regions.get(key).copied()
    }

    /// The number of images in the atlas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns true if the atlas holds no images.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::{math::Size, Sprite};

    fn solid(width: u32, height: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255]))
    }

    #[test]
    fn regions_sample_their_image() {
        let atlas = TextureAtlas::build(
            vec![
                ("wide", solid(16, 4, 10)),
                ("tall", solid(4, 16, 20)),
                ("small", solid(4, 4, 30)),
            ],
            64,
        )
        .unwrap();
        assert_eq!(atlas.len(), 3);

        let size = atlas.texture().size();
        for (key, value, expected) in &[
            ("wide", 10, Size::new(16, 4)),
            ("tall", 20, Size::new(4, 16)),
            ("small", 30, Size::new(4, 4)),
        ] {
            let region = atlas.region(key).unwrap();
            assert_eq!(region.size_in(atlas.texture()), *expected);
            let x = (region.uv0.x * size.width as f32) as u32;
            let y = (region.uv0.y * size.height as f32) as u32;
            assert_eq!(atlas.texture().image.get_pixel(x, y)[0], *value);
        }
    }

    #[test]
    fn sprites_resize_to_regions() {
        let atlas = TextureAtlas::build(vec![(0, solid(8, 8, 1)), (1, solid(24, 8, 2))], 32).unwrap();
        let mut sprite = Sprite::new(atlas.texture());
        sprite.set_region(atlas.region(&1).unwrap(), true);
        assert_eq!(sprite.size(), Size::new(24., 8.));
    }

    #[test]
    fn packing_failures() {
        assert!(matches!(
            TextureAtlas::<u8>::build(Vec::new(), 32),
            Err(Error::AtlasPacking)
        ));
        assert!(matches!(
            TextureAtlas::build(vec![(0, solid(33, 1, 0))], 32),
            Err(Error::AtlasPacking)
        ));
    }
}
