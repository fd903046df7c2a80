//! Packs rectangles into the smallest canvas found within a maximum width.
//!
//! Rectangles are placed tallest first. Each placement takes the smallest free
//! cell it fits in and splits the remainder into a cell to its right and a
//! cell below it. When a rectangle does not fit anywhere the canvas grows by
//! one pixel in height and placement restarts. Every complete packing is
//! scored by the area it covers, and the search continues with the canvas one
//! pixel narrower until it becomes narrower than the widest rectangle.

use crate::math::{Point, Rect, Size};

/// A rectangle waiting to be packed.
#[derive(Debug, Clone)]
struct Pending<T> {
    size: Size<u32>,
    data: T,
}

/// Packs rectangles into a canvas no wider than a maximum width.
#[derive(Debug, Clone)]
pub struct RectanglePacker<T> {
    max_width: u32,
    rectangles: Vec<Pending<T>>,
}

/// A rectangle placed by [`RectanglePacker::pack`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedRect<T> {
    /// The placement within the canvas.
    pub area: Rect<u32>,
    /// The value the rectangle was added with.
    pub data: T,
}

/// The result of packing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Packing<T> {
    /// Every rectangle, tallest first.
    pub rectangles: Vec<PackedRect<T>>,
    /// The size of the canvas that contains every rectangle.
    pub canvas: Size<u32>,
    /// `canvas.width * canvas.height`.
    pub area: u32,
}

impl<T> RectanglePacker<T> {
    /// Returns a packer that produces canvases at most `max_width` wide.
    #[must_use]
    pub const fn new(max_width: u32) -> Self {
        Self {
            max_width,
            rectangles: Vec::new(),
        }
    }

    /// The widest canvas this packer produces.
    #[must_use]
    pub const fn max_width(&self) -> u32 {
        self.max_width
    }

    /// Queues a `width` x `height` rectangle carrying `data`.
    pub fn add_rect(&mut self, width: u32, height: u32, data: T) {
        self.rectangles.push(Pending {
            size: Size::new(width, height),
            data,
        });
    }

    /// Removes every queued rectangle.
    pub fn clear_rects(&mut self) {
        self.rectangles.clear();
    }

    /// The number of queued rectangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rectangles.len()
    }

    /// Returns true if no rectangles are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }

    /// Packs the queued rectangles. Returns `None` if there are no rectangles
    /// or if a rectangle is wider than the maximum width.
    #[must_use]
    pub fn pack(&self) -> Option<Packing<T>>
    where
        T: Clone,
    {
        let mut order = (0..self.rectangles.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| {
            self.rectangles[b]
                .size
                .height
                .cmp(&self.rectangles[a].size.height)
        });
        let sizes = order
            .iter()
            .map(|&index| self.rectangles[index].size)
            .collect::<Vec<_>>();

        let (origins, canvas) = search(&sizes, self.max_width)?;
        tracing::debug!(
            rectangles = sizes.len(),
            width = canvas.width,
            height = canvas.height,
            "packed rectangles"
        );

        let rectangles = order
            .iter()
            .zip(origins)
            .map(|(&index, origin)| {
                let pending = &self.rectangles[index];
                PackedRect {
                    area: Rect::new(origin, pending.size),
                    data: pending.data.clone(),
                }
            })
            .collect();
        Some(Packing {
            rectangles,
            canvas,
            area: canvas.area(),
        })
    }
}

/// Finds the placement of `sizes`, which must be sorted tallest first.
fn search(sizes: &[Size<u32>], max_width: u32) -> Option<(Vec<Point<u32>>, Size<u32>)> {
    let widest = sizes.iter().map(|size| size.width).max()?;
    let mut canvas = Size::new(max_width, sizes[0].height);
    let mut best: Option<(Vec<Point<u32>>, Size<u32>)> = None;

    while canvas.width >= widest {
        match place_all(sizes, canvas) {
            Some((origins, rightmost)) => {
                let used = Size::new(rightmost, canvas.height);
                let improves = best
                    .as_ref()
                    .map_or(true, |(_, best)| used.area() < best.area());
                if improves {
                    if best.is_none() {
                        canvas.width = rightmost;
                    }
                    best = Some((origins, used));
                }

                if canvas.width == 0 {
                    break;
                }
                canvas.width -= 1;
            }
            None => canvas.height += 1,
        }
    }

    best
}

/// Places every rectangle within `canvas`, returning each origin and the
/// rightmost extent used.
fn place_all(sizes: &[Size<u32>], canvas: Size<u32>) -> Option<(Vec<Point<u32>>, u32)> {
    let mut cells = vec![Rect::new(Point::zero(), canvas)];
    let mut origins = Vec::with_capacity(sizes.len());
    let mut rightmost = 0;

    for size in sizes {
        let (index, cell) = cells
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, cell)| cell.size.width >= size.width && cell.size.height >= size.height)
            .min_by_key(|(_, cell)| cell.size.area())?;
        cells.remove(index);

        origins.push(cell.origin);
        rightmost = rightmost.max(cell.origin.x + size.width);

        let right = Rect::new(
            Point::new(cell.origin.x + size.width, cell.origin.y),
            Size::new(cell.size.width - size.width, size.height),
        );
        let below = Rect::new(
            Point::new(cell.origin.x, cell.origin.y + size.height),
            Size::new(cell.size.width, cell.size.height - size.height),
        );
        cells.extend(
            [right, below]
                .iter()
                .copied()
                .filter(|cell| cell.size.area() > 0),
        );
    }

    Some((origins, rightmost))
}
