use log::{debug, trace};

use shadowvg_core::blur::{BlurBackend, BlurHandle};
use shadowvg_core::math::{ScaleFactor, SizeI32};
use shadowvg_core::pixmap::{Pixmap, PixmapFormat};

use crate::config::ShadowConfig;
use crate::error::ShadowError;
use crate::geometry::ShadowGeometry;

/// The fingerprint of the last allocation, used to decide reuse vs.
/// reallocation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BufferSpec {
    bounds: SizeI32,
    downscale: f32,
    with_color: bool,
    with_dpi_scale: bool,
    with_css_scale: bool,
}

impl BufferSpec {
    fn new(config: &ShadowConfig, bounds: SizeI32) -> Self {
        Self {
            bounds,
            downscale: config.downscale(),
            with_color: config.with_color(),
            with_dpi_scale: config.with_dpi_scale(),
            with_css_scale: config.with_css_scale(),
        }
    }
}

/// Exclusive owner of the offscreen shadow buffer and the blur handle.
///
/// The two have independent lifecycles: the buffer is recreated on any
/// size or scale change, while the blur handle is recreated only when the
/// color mode toggles.
#[derive(Default)]
pub struct ShadowBufferManager {
    pixmap: Option<Pixmap>,
    handle: Option<Box<dyn BlurHandle>>,
    last_spec: Option<BufferSpec>,
    allocations: u64,
}

impl ShadowBufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shadow buffer for the given configuration and bounds,
    /// reallocating only when the buffer specs diverge from the last
    /// allocation.
    ///
    /// Empty bounds mean no shadow to render: any held buffer is released
    /// and `Ok(None)` is returned.
    pub fn ensure_buffer(
        &mut self,
        config: &ShadowConfig,
        bounds: SizeI32,
        scale_factor: ScaleFactor,
    ) -> Result<Option<&mut Pixmap>, ShadowError> {
        if bounds.width <= 0 || bounds.height <= 0 {
            if self.pixmap.take().is_some() {
                debug!("bounds are empty, releasing shadow buffer");
            }
            self.last_spec = None;
            return Ok(self.pixmap.as_mut());
        }

        let spec = BufferSpec::new(config, bounds);
        if self.pixmap.is_some() && self.last_spec == Some(spec) {
            trace!("reusing shadow buffer for {}x{}", bounds.width, bounds.height);
            return Ok(self.pixmap.as_mut());
        }

        // Drop the stale buffer before allocating the replacement, and make
        // sure a failed allocation leaves nothing half-constructed behind.
        self.pixmap = None;
        self.last_spec = None;

        let geometry = ShadowGeometry::new(config, scale_factor);
        let size = geometry.buffer_size(bounds);
        let format = if config.with_color() {
            PixmapFormat::Rgba8
        } else {
            PixmapFormat::Alpha8
        };
        let pixmap = Pixmap::new(size.width.max(0) as u32, size.height.max(0) as u32, format)?;

        debug!(
            "allocated {}x{} {:?} shadow buffer for {}x{} bounds",
            pixmap.width(),
            pixmap.height(),
            format,
            bounds.width,
            bounds.height
        );
        self.allocations += 1;
        self.last_spec = Some(spec);
        Ok(Some(self.pixmap.insert(pixmap)))
    }

    /// Returns the blur handle for the requested color mode, recreating it
    /// only when the mode diverges from the held handle.
    pub fn blur_handle(
        &mut self,
        backend: &dyn BlurBackend,
        with_color: bool,
    ) -> Result<&mut dyn BlurHandle, ShadowError> {
        let format = if with_color {
            PixmapFormat::Rgba8
        } else {
            PixmapFormat::Alpha8
        };

        let handle = match self.handle.take() {
            Some(handle) if handle.format() == format => handle,
            stale => {
                if stale.is_some() {
                    trace!("color mode changed, recreating blur handle");
                }
                backend.create_handle(format)?
            }
        };
        Ok(self.handle.insert(handle).as_mut())
    }

    /// Blurs the held buffer in place. A no-op when no buffer is held.
    pub fn blur(
        &mut self,
        backend: &dyn BlurBackend,
        with_color: bool,
        radius: f32,
    ) -> Result<(), ShadowError> {
        self.blur_handle(backend, with_color)?;
        let (Some(pixmap), Some(handle)) = (self.pixmap.as_mut(), self.handle.as_deref_mut())
        else {
            return Ok(());
        };
        handle.blur(pixmap, radius)?;
        Ok(())
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    pub fn pixmap_mut(&mut self) -> Option<&mut Pixmap> {
        self.pixmap.as_mut()
    }

    /// Forces the buffer to be recreated on the next [`ensure_buffer`];
    /// called when a setter changes the buffer specs.
    ///
    /// The blur handle is left alone: its lifecycle is keyed on the color
    /// mode, which [`blur_handle`] re-checks on every access.
    ///
    /// [`ensure_buffer`]: Self::ensure_buffer
    /// [`blur_handle`]: Self::blur_handle
    pub fn invalidate(&mut self) {
        self.pixmap = None;
        self.last_spec = None;
    }

    /// Releases the buffer and blur handle. Idempotent.
    pub fn destroy(&mut self) {
        if self.pixmap.is_some() || self.handle.is_some() {
            debug!("destroying shadow buffer and blur handle");
        }
        self.pixmap = None;
        self.handle = None;
        self.last_spec = None;
    }

    /// Number of buffer allocations performed so far.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }
}
