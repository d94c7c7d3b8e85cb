use shadowvg_core::blur::BlurError;
use shadowvg_core::pixmap::PixmapError;

/// Errors are local and recoverable: the compositor reacts to any of these
/// by omitting the shadow for the frame while still drawing host content.
#[derive(thiserror::Error, Debug)]
pub enum ShadowError {
    #[error("shadow buffer allocation failed: {0}")]
    Allocation(#[from] PixmapError),

    #[error("blur backend error: {0}")]
    Blur(#[from] BlurError),
}
