/// A unit representing pixels in the coordinate space geometry is submitted in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Pixels;

/// A unit representing normalized device coordinates after projection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Clip;

/// A type representing an x and y coordinate.
pub type Point<T = f32, Unit = Pixels> = euclid::Point2D<T, Unit>;
/// A type representing a width and height.
pub type Size<T = f32, Unit = Pixels> = euclid::Size2D<T, Unit>;
/// A type representing a vector with magnitudes x and y.
pub type Vector<T = f32, Unit = Pixels> = euclid::Vector2D<T, Unit>;
/// A type representing a [`Point`] and [`Size`].
pub type Rect<T = f32, Unit = Pixels> = euclid::Rect<T, Unit>;
/// A type representing an angle of measurement.
pub type Angle = euclid::Angle<f32>;
/// A 2d affine transformation, used to place sprite quads.
pub type Transform = euclid::Transform2D<f32, Pixels, Pixels>;
/// The matrix used to project submitted geometry onto the screen.
pub type Projection = euclid::Transform3D<f32, Pixels, Clip>;

/// Returns an orthographic projection mapping a `width` x `height` pixel
/// surface with the origin in the top-left corner.
#[must_use]
pub fn ortho(width: f32, height: f32) -> Projection {
    Projection::ortho(0., width, height, 0., -1., 1.)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn ortho_maps_corners() {
        let projection = ortho(800., 600.);
        let top_left = projection
            .transform_point2d(Point::new(0., 0.))
            .expect("affine");
        assert_relative_eq!(top_left.x, -1.);
        assert_relative_eq!(top_left.y, 1.);
        let bottom_right = projection
            .transform_point2d(Point::new(800., 600.))
            .expect("affine");
        assert_relative_eq!(bottom_right.x, 1.);
        assert_relative_eq!(bottom_right.y, -1.);
    }
}
