use std::f32::consts::TAU;

use lyon_tessellation::{
    math::point, path::Path, BuffersBuilder, FillOptions, FillTessellator, FillVertex,
    StrokeOptions, StrokeTessellator, StrokeVertex, VertexBuffers,
};

use crate::{
    math::{Point, Rect},
    vertex::QUAD_INDICES,
    Batch, Color, Error, Texture, Vertex,
};

/// Filled geometry that can be drawn through a [`Batch`], optionally
/// outlined with a pen.
///
/// Texture coordinates span the shape's bounding box, oriented the same way
/// as a [`Sprite`](crate::Sprite) showing a full texture. The outline is
/// untextured and centered on the shape's edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    fill_color: Color,
    fill_texture: Option<Texture>,
    outline: Vec<Point>,
    pen_color: Color,
    pen_size: f32,
    stroke_vertices: Vec<Vertex>,
    stroke_indices: Vec<u32>,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            fill_color: Color::WHITE,
            fill_texture: None,
            outline: Vec::new(),
            pen_color: Color::BLACK,
            pen_size: 0.,
            stroke_vertices: Vec::new(),
            stroke_indices: Vec::new(),
        }
    }
}

impl Shape {
    /// Returns a rectangle.
    #[must_use]
    pub fn rect(rect: Rect) -> Self {
        let corners = [
            rect.min(),
            Point::new(rect.max_x(), rect.min_y()),
            rect.max(),
            Point::new(rect.min_x(), rect.max_y()),
        ];
        Self::from_geometry(&corners, QUAD_INDICES.to_vec(), corners.to_vec())
    }

    /// Returns a circle approximated by a triangle fan with `segments` outer
    /// vertices. When `segments` is `None`, a count is picked based on the
    /// circumference. Circles with a radius of zero or less are empty.
    #[must_use]
    pub fn circle(center: Point, radius: f32, segments: Option<u32>) -> Self {
        if radius <= 0. {
            return Self::default();
        }

        let segments = segments
            .unwrap_or_else(|| default_segments(radius))
            .max(3);
        let mut points = Vec::with_capacity(segments as usize + 1);
        points.push(center);
        for segment in 0..segments {
            let angle = TAU * segment as f32 / segments as f32;
            points.push(Point::new(
                radius.mul_add(angle.cos(), center.x),
                radius.mul_add(angle.sin(), center.y),
            ));
        }

        let mut indices = Vec::with_capacity(segments as usize * 3);
        for segment in 1..=segments {
            let next = segment % segments + 1;
            indices.extend_from_slice(&[0, segment, next]);
        }

        let outline = points[1..].to_vec();
        Self::from_geometry(&points, indices, outline)
    }

    /// Returns the area enclosed by `outline`, which may be concave.
    pub fn polygon(outline: &[Point]) -> crate::Result<Self> {
        let path = match closed_path(outline) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
        FillTessellator::new()
            .tessellate_path(
                &path,
                &FillOptions::default(),
                &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex<'_>| {
                    vertex.position().to_array()
                }),
            )
            .map_err(Error::Tessellation)?;

        let points = geometry
            .vertices
            .iter()
            .map(|&position| Point::from(position))
            .collect::<Vec<_>>();
        Ok(Self::from_geometry(&points, geometry.indices, outline.to_vec()))
    }

    fn from_geometry(points: &[Point], indices: Vec<u32>, outline: Vec<Point>) -> Self {
        let bounds = Rect::from_points(points);
        let vertices = points
            .iter()
            .map(|&position| Vertex::new(position, Color::WHITE, tex_coord(position, &bounds)))
            .collect();
        Self {
            vertices,
            indices,
            outline,
            ..Self::default()
        }
    }

    /// The color every vertex is tinted with.
    #[must_use]
    pub const fn fill_color(&self) -> Color {
        self.fill_color
    }

    /// Sets the color every vertex is tinted with.
    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
        let rgba = color.rgba8();
        for vertex in &mut self.vertices {
            vertex.color = rgba;
        }
    }

    /// The texture stretched across the shape.
    #[must_use]
    pub const fn fill_texture(&self) -> Option<&Texture> {
        self.fill_texture.as_ref()
    }

    /// Sets the texture stretched across the shape.
    pub fn set_fill_texture(&mut self, texture: Option<&Texture>) {
        self.fill_texture = texture.cloned();
    }

    /// The color of the outline.
    #[must_use]
    pub const fn pen_color(&self) -> Color {
        self.pen_color
    }

    /// Sets the color of the outline.
    pub fn set_pen_color(&mut self, color: Color) {
        self.pen_color = color;
        let rgba = color.rgba8();
        for vertex in &mut self.stroke_vertices {
            vertex.color = rgba;
        }
    }

    /// The width of the outline. Zero means the shape is not outlined.
    #[must_use]
    pub const fn pen_size(&self) -> f32 {
        self.pen_size
    }

    /// Sets the width of the outline and tessellates it. A width of zero or
    /// less removes the outline.
    pub fn set_pen_size(&mut self, size: f32) -> crate::Result<()> {
        self.pen_size = size.max(0.);
        self.stroke_vertices.clear();
        self.stroke_indices.clear();
        if self.pen_size <= 0. {
            return Ok(());
        }

        let path = match closed_path(&self.outline) {
            Some(path) => path,
            None => return Ok(()),
        };

        let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
        StrokeTessellator::new()
            .tessellate_path(
                &path,
                &StrokeOptions::default().with_line_width(self.pen_size),
                &mut BuffersBuilder::new(&mut geometry, |vertex: StrokeVertex<'_, '_>| {
                    vertex.position().to_array()
                }),
            )
            .map_err(Error::Tessellation)?;

        let rgba = self.pen_color.rgba8();
        self.stroke_vertices = geometry
            .vertices
            .iter()
            .map(|&position| Vertex {
                position,
                color: rgba,
                tex_coord: [0., 0.],
            })
            .collect();
        self.stroke_indices = geometry.indices;
        Ok(())
    }

    /// The triangulated vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The triangle list referencing [`Self::vertices`].
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The triangulated outline, empty unless a pen size is set.
    #[must_use]
    pub fn stroke_vertices(&self) -> &[Vertex] {
        &self.stroke_vertices
    }

    /// The triangle list referencing [`Self::stroke_vertices`].
    #[must_use]
    pub fn stroke_indices(&self) -> &[u32] {
        &self.stroke_indices
    }

    /// Selects the fill texture on `batch` and submits the geometry. The
    /// outline follows untextured, leaving no texture selected.
    pub fn draw(&self, batch: &mut Batch) {
        batch.set_texture(self.fill_texture.as_ref());
        batch.add_vertices(&self.vertices, &self.indices);
        if !self.stroke_indices.is_empty() {
            batch.set_texture(None);
            batch.add_vertices(&self.stroke_vertices, &self.stroke_indices);
        }
    }
}

fn closed_path(outline: &[Point]) -> Option<Path> {
    let (start, rest) = outline.split_first()?;
    let mut builder = Path::builder();
    builder.begin(point(start.x, start.y));
    for p in rest {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    Some(builder.build())
}

#[allow(clippy::cast_sign_loss)]
fn default_segments(radius: f32) -> u32 {
    // One segment per 8 pixels of circumference.
    (TAU * radius / 8.).ceil().max(8.) as u32
}

fn tex_coord(position: Point, bounds: &Rect) -> [f32; 2] {
    let normalize = |value: f32, start: f32, length: f32| {
        if length > 0. {
            (value - start) / length
        } else {
            0.
        }
    };
    [
        normalize(position.x, bounds.min_x(), bounds.width()),
        1. - normalize(position.y, bounds.min_y(), bounds.height()),
    ]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use image::RgbaImage;

    use super::*;
    use crate::math::Size;

    fn triangle_area(shape: &Shape) -> f32 {
        shape
            .indices()
            .chunks(3)
            .map(|triangle| {
                let [a, b, c] = [
                    shape.vertices()[triangle[0] as usize].location(),
                    shape.vertices()[triangle[1] as usize].location(),
                    shape.vertices()[triangle[2] as usize].location(),
                ];
                ((b - a).cross(c - a) / 2.).abs()
            })
            .sum()
    }

    #[test]
    fn rect_geometry() {
        let shape = Shape::rect(Rect::new(Point::new(10., 20.), Size::new(30., 40.)));
        assert_eq!(shape.vertices().len(), 4);
        assert_eq!(shape.indices(), &QUAD_INDICES);
        assert_eq!(shape.vertices()[2].position, [40., 60.]);
        assert_eq!(shape.vertices()[0].tex_coord, [0., 1.]);
        assert_eq!(shape.vertices()[2].tex_coord, [1., 0.]);
        assert_relative_eq!(triangle_area(&shape), 1200.);
    }

    #[test]
    fn circle_fan() {
        let shape = Shape::circle(Point::new(0., 0.), 10., Some(4));
        assert_eq!(shape.vertices().len(), 5);
        assert_eq!(shape.indices(), &[0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 1]);
        assert_relative_eq!(triangle_area(&shape), 200., epsilon = 1e-3);

        let smooth = Shape::circle(Point::new(0., 0.), 100., None);
        assert_eq!(smooth.vertices().len(), 80);
        assert!(Shape::circle(Point::new(0., 0.), 0., None).vertices().is_empty());
    }

    #[test]
    fn concave_polygon() {
        let outline = [
            Point::new(0., 0.),
            Point::new(20., 0.),
            Point::new(20., 20.),
            Point::new(10., 10.),
            Point::new(0., 20.),
        ];
        let shape = Shape::polygon(&outline).unwrap();
        assert_eq!(shape.indices().len() % 3, 0);
        assert_relative_eq!(triangle_area(&shape), 300., epsilon = 1e-2);
        assert!(Shape::polygon(&[]).unwrap().vertices().is_empty());
    }

    #[test]
    fn fill_settings_apply_when_drawn() {
        let texture = Texture::from_rgba(RgbaImage::new(2, 2));
        let mut shape = Shape::rect(Rect::new(Point::zero(), Size::new(1., 1.)));
        shape.set_fill_color(Color::RED);
        shape.set_fill_texture(Some(&texture));

        let mut batch = Batch::new();
        shape.draw(&mut batch);
        let buffer = batch.buffer(Some(&texture)).unwrap();
        assert!(buffer.vertices().iter().all(|v| v.color == [255, 0, 0, 255]));
        assert_eq!(buffer.indices().len(), 6);
    }

    #[test]
    fn no_outline_without_pen() {
        let mut shape = Shape::rect(Rect::new(Point::zero(), Size::new(10., 10.)));
        shape.set_pen_color(Color::BLUE);
        assert!(shape.stroke_vertices().is_empty());

        let mut batch = Batch::new();
        shape.draw(&mut batch);
        assert_eq!(batch.buffer_count(), 1);
        assert_eq!(batch.buffer(None).unwrap().indices().len(), 6);
    }

    #[test]
    fn rect_outline_straddles_edge() {
        let mut shape = Shape::rect(Rect::new(Point::zero(), Size::new(10., 10.)));
        shape.set_pen_size(2.).unwrap();
        assert_eq!(shape.pen_size(), 2.);
        assert_eq!(shape.stroke_indices().len() % 3, 0);

        let points = shape
            .stroke_vertices()
            .iter()
            .map(Vertex::location)
            .collect::<Vec<_>>();
        let bounds = Rect::from_points(&points);
        assert_relative_eq!(bounds.min_x(), -1., epsilon = 1e-3);
        assert_relative_eq!(bounds.min_y(), -1., epsilon = 1e-3);
        assert_relative_eq!(bounds.max_x(), 11., epsilon = 1e-3);
        assert_relative_eq!(bounds.max_y(), 11., epsilon = 1e-3);

        shape.set_pen_size(0.).unwrap();
        assert!(shape.stroke_vertices().is_empty());
    }

    #[test]
    fn outline_drawn_after_fill_in_pen_color() {
        let texture = Texture::from_rgba(RgbaImage::new(2, 2));
        let mut shape = Shape::circle(Point::new(0., 0.), 10., Some(6));
        shape.set_fill_texture(Some(&texture));
        shape.set_pen_size(1.5).unwrap();
        shape.set_pen_color(Color::RED);

        let mut batch = Batch::new();
        shape.draw(&mut batch);
        assert_eq!(batch.buffer_count(), 2);
        assert_eq!(batch.texture(), None);

        let fill = batch.buffer(Some(&texture)).unwrap();
        let stroke = batch.buffer(None).unwrap();
        assert!(fill.draw_order() < stroke.draw_order());
        assert_eq!(fill.vertices().len(), 7);
        assert_eq!(stroke.vertices().len(), shape.stroke_vertices().len());
        assert!(stroke.vertices().iter().all(|v| v.color == [255, 0, 0, 255]));
        // The center of the fan is not part of the outline.
        assert!(stroke
            .vertices()
            .iter()
            .all(|v| v.location().to_vector().length() > 8.));
    }

    #[test]
    fn polygon_outline() {
        let outline = [Point::new(0., 0.), Point::new(20., 0.), Point::new(10., 20.)];
        let mut shape = Shape::polygon(&outline).unwrap();
        shape.set_pen_size(1.).unwrap();
        assert!(!shape.stroke_indices().is_empty());

        let mut empty = Shape::polygon(&[]).unwrap();
        empty.set_pen_size(3.).unwrap();
        assert!(empty.stroke_vertices().is_empty());
    }
}
