//! A CSS-like soft drop shadow compositor: host content is rasterized into
//! a downscaled, margin-padded offscreen buffer, blurred, and composited
//! behind the original content.

mod buffer;
mod compositor;
mod config;
mod geometry;
mod layer;

pub mod error;

pub use buffer::ShadowBufferManager;
pub use compositor::render_frame;
pub use config::{ConfigChanges, ShadowConfig};
pub use error::ShadowError;
pub use geometry::{ShadowGeometry, CSS_RATIO};
pub use layer::ShadowLayer;

pub use shadowvg_core::*;

#[cfg(feature = "software")]
pub use shadowvg_blur as software;
