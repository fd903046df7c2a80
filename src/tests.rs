use approx::assert_relative_eq;
use image::{Rgba, RgbaImage};
use tracing::Level;

use crate::{prelude::*, Error};

fn init_tracing() {
    drop(
        tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_test_writer()
            .try_init(),
    );
}

fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

#[test]
fn submitted_geometry_round_trips_through_draws() {
    init_tracing();
    let mut device = HeadlessDevice::new();
    let mut batch = Batch::new();
    let mut expected = Vec::new();
    for i in 0..5 {
        let sprite = Sprite::default()
            .with_position(Point::new(i as f32 * 10., 0.))
            .with_size(Size::new(8., 8.));
        let (vertices, indices) = sprite.quad();
        expected.extend(indices.iter().map(|&index| vertices[index as usize]));
        sprite.draw(&mut batch);
    }

    batch.draw(&mut device);
    assert_eq!(device.draws().len(), 1);
    assert_eq!(device.draws()[0].resolved_vertices(), expected);
}

#[test]
fn identity_sprite_covers_its_size() {
    init_tracing();
    let texture = Texture::from_rgba(solid(48, 24, [0, 0, 0, 255]));
    let sprite = Sprite::new(&texture);
    let (vertices, _) = sprite.quad();
    let corners = vertices
        .iter()
        .map(|vertex| vertex.position)
        .collect::<Vec<_>>();
    assert_eq!(corners, vec![[0., 0.], [48., 0.], [48., 24.], [0., 24.]]);
}

#[test]
fn static_batches_without_buffer_objects() {
    init_tracing();
    let mut device = HeadlessDevice::without_buffer_objects();
    let mut batch = Batch::new();
    Shape::rect(Rect::new(Point::zero(), Size::new(4., 4.))).draw(&mut batch);

    let error = batch.make_static(&mut device).unwrap_err();
    assert!(matches!(
        error,
        Error::FeatureUnsupported(Feature::VertexBufferObjects)
    ));
    assert!(!batch.is_static());
    assert_eq!(batch.buffer_count(), 1);

    batch.draw(&mut device);
    let draw = &device.draws()[0];
    assert!(draw.buffer.is_none());
    assert_eq!(draw.indices.len(), 6);
}

#[test]
fn frozen_batches_ignore_submissions() {
    init_tracing();
    let mut device = HeadlessDevice::new();
    let mut batch = Batch::new();
    Shape::circle(Point::new(10., 10.), 5., Some(6)).draw(&mut batch);
    batch.make_static(&mut device).unwrap();

    Shape::rect(Rect::new(Point::zero(), Size::new(4., 4.))).draw(&mut batch);
    batch.draw(&mut device);

    let draws = device.take_draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].vertices.len(), 7);
    assert_eq!(draws[0].indices.len(), 18);
}

#[test]
fn static_sprite_batch_updates_one_sprite() {
    init_tracing();
    let mut device = HeadlessDevice::new();
    let atlas = TextureAtlas::build(
        vec![
            ("player", solid(16, 16, [255, 0, 0, 255])),
            ("tree", solid(16, 32, [0, 255, 0, 255])),
        ],
        64,
    )
    .unwrap();

    let mut sprites = SpriteBatch::new();
    sprites.set_projection_matrix(ortho(320., 240.));
    for (i, key) in ["tree", "player", "tree"].iter().enumerate() {
        let mut sprite = Sprite::new(atlas.texture()).with_position(Point::new(i as f32 * 40., 0.));
        sprite.set_region(atlas.region(key).unwrap(), true);
        sprites.add(SharedSprite::new(sprite));
    }
    sprites.make_static(&mut device).unwrap();
    sprites.draw(&mut device);
    let before = device.take_draws().remove(0).vertices;

    let player = sprites.get(1).unwrap();
    player.write().move_by(Vector::new(0., 100.));
    sprites.draw(&mut device);
    let after = device.take_draws().remove(0).vertices;

    assert_eq!(before.len(), 12);
    for (index, (old, new)) in before.iter().zip(&after).enumerate() {
        if (4..8).contains(&index) {
            assert_relative_eq!(new.position[1], old.position[1] + 100.);
        } else {
            assert_eq!(old, new);
        }
    }
}

#[test]
fn draw_order_follows_first_use() {
    init_tracing();
    let mut device = HeadlessDevice::new();
    let textures = (0..3)
        .map(|_| Texture::from_rgba(solid(2, 2, [255; 4])))
        .collect::<Vec<_>>();
    let mut sprites = SpriteBatch::new();
    for index in &[2, 0, 2, 1, 0] {
        sprites.add(SharedSprite::new(Sprite::new(&textures[*index])));
    }

    sprites.draw(&mut device);
    let order = device
        .draws()
        .iter()
        .map(|draw| draw.texture)
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![
            Some(textures[2].id()),
            Some(textures[0].id()),
            Some(textures[1].id())
        ]
    );
    assert_eq!(device.draws()[0].indices.len(), 12);
}

#[test]
fn clear_returns_to_an_empty_dynamic_batch() {
    init_tracing();
    let mut device = HeadlessDevice::new();
    let texture = Texture::from_rgba(solid(4, 4, [255; 4]));
    let mut sprites = SpriteBatch::new();
    sprites.add(SharedSprite::new(Sprite::new(&texture)));
    sprites.make_static(&mut device).unwrap();
    assert_eq!(device.live_buffers(), 1);

    sprites.clear();
    assert!(sprites.is_empty());
    assert!(!sprites.is_static());
    assert_eq!(sprites.buffer_count(), 0);
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(texture.reference_count(), 1);

    sprites.add(SharedSprite::new(Sprite::new(&texture)));
    sprites.draw(&mut device);
    assert_eq!(device.draws().len(), 1);
    assert!(device.draws()[0].buffer.is_none());
}

#[test]
fn dropping_a_static_batch_releases_buffer_objects() {
    init_tracing();
    let mut device = HeadlessDevice::new();
    let mut batch = Batch::new();
    for i in 0..3 {
        let texture = Texture::from_rgba(solid(1, 1, [i; 4]));
        Sprite::new(&texture).draw(&mut batch);
    }
    batch.make_static(&mut device).unwrap();
    assert_eq!(device.live_buffers(), 3);

    drop(batch);
    assert_eq!(device.live_buffers(), 0);
}
