use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use lazy_static::lazy_static;

lazy_static! {
    static ref GLOBAL_ID_CELL: AtomicU64 = AtomicU64::new(0);
}

/// A stable identity for a [`Shader`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ShaderId(u64);

/// An opaque handle to a compiled shader program. Compilation happens outside
/// of this crate; batches only carry the handle through to the
/// [`GraphicsDevice`](crate::device::GraphicsDevice).
#[derive(Debug, Clone)]
pub struct Shader {
    id: ShaderId,
    name: Arc<str>,
}

impl Shader {
    /// Returns a new handle labeled `name`.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            id: ShaderId(GLOBAL_ID_CELL.fetch_add(1, Ordering::SeqCst)),
            name: name.into(),
        }
    }

    /// The unique ID of this shader.
    #[must_use]
    pub const fn id(&self) -> ShaderId {
        self.id
    }

    /// The label this shader was created with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Shader {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A factor in the blend equation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendFactor {
    /// `0`
    Zero,
    /// `1`
    One,
    /// The source color.
    SrcColor,
    /// `1 - source color`
    OneMinusSrcColor,
    /// The source alpha.
    SrcAlpha,
    /// `1 - source alpha`
    OneMinusSrcAlpha,
    /// The destination color.
    DstColor,
    /// `1 - destination color`
    OneMinusDstColor,
    /// The destination alpha.
    DstAlpha,
    /// `1 - destination alpha`
    OneMinusDstAlpha,
}

/// How newly drawn pixels are combined with the back buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendState {
    /// Factor applied to the incoming color.
    pub source: BlendFactor,
    /// Factor applied to the color already in the back buffer.
    pub destination: BlendFactor,
}

impl BlendState {
    /// Standard alpha blending.
    pub const ALPHA: Self = Self::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
    /// Source and destination are summed.
    pub const ADDITIVE: Self = Self::new(BlendFactor::SrcAlpha, BlendFactor::One);
    /// The incoming color replaces the destination.
    pub const OPAQUE: Self = Self::new(BlendFactor::One, BlendFactor::Zero);

    /// Returns a blend state using `source` and `destination` factors.
    #[must_use]
    pub const fn new(source: BlendFactor, destination: BlendFactor) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::ALPHA
    }
}
