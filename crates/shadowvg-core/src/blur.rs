//! The seam between the compositing pipeline and whatever blur primitive
//! the host provides.

use crate::pixmap::{Pixmap, PixmapFormat};

/// The hard maximum blur radius supported by blur handles.
///
/// Radii above this are silently clamped by callers, and the buffer margin
/// reserved for blur spread is always sized to this value so that the
/// radius can be animated without reallocating the buffer.
pub const MAX_BLUR_RADIUS: f32 = 25.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BlurError {
    #[error("no blur backend available for {0:?}")]
    Unavailable(PixmapFormat),

    #[error("pixmap format {pixmap:?} does not match blur handle format {handle:?}")]
    FormatMismatch {
        pixmap: PixmapFormat,
        handle: PixmapFormat,
    },
}

/// A blur primitive bound to a single pixel format.
///
/// Callers short-circuit on a zero radius and never invoke [`blur`] for it,
/// so implementations may assume `0.0 < radius <= MAX_BLUR_RADIUS`.
///
/// [`blur`]: BlurHandle::blur
pub trait BlurHandle {
    /// The pixel format this handle was created for.
    fn format(&self) -> PixmapFormat;

    /// Blurs the pixmap in place.
    ///
    /// `Rgba8` pixmaps blur all four channels together; `Alpha8` pixmaps
    /// blur the single coverage channel.
    fn blur(&mut self, pixmap: &mut Pixmap, radius: f32) -> Result<(), BlurError>;
}

/// A factory for [`BlurHandle`]s.
pub trait BlurBackend {
    fn create_handle(&self, format: PixmapFormat) -> Result<Box<dyn BlurHandle>, BlurError>;
}
