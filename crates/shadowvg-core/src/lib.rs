pub mod blur;
pub mod canvas;
pub mod color;
pub mod math;
pub mod pixmap;

pub use blur::{BlurBackend, BlurError, BlurHandle, MAX_BLUR_RADIUS};
pub use canvas::{Canvas, RenderSource};
pub use pixmap::{Pixmap, PixmapError, PixmapFormat};
