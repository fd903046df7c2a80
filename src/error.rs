use lyon_tessellation::TessellationError;

use crate::device::Feature;

/// All errors that `x2d-batch` can return.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The graphics device lacks a feature the operation requires. The batch
    /// is left unchanged and can continue to be used without it.
    #[error("feature not supported by the graphics device: {0:?}")]
    FeatureUnsupported(Feature),
    /// An error opening an image.
    #[error("error reading image: {0}")]
    Image(#[from] image::ImageError),
    /// An error while tessellating a shape.
    #[error("error tessellating shape: {0:?}")]
    Tessellation(TessellationError),
    /// The images given to a texture atlas could not be packed.
    #[error("images could not be packed into an atlas")]
    AtlasPacking,
    /// A scripting host rejected a class registration.
    #[error("script registration failed: {0}")]
    Registration(String),
}
