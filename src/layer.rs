use log::warn;

use shadowvg_core::blur::BlurBackend;
use shadowvg_core::canvas::RenderSource;
use shadowvg_core::color::RGBA8;
use shadowvg_core::math::{ScaleFactor, SizeI32};
use shadowvg_core::pixmap::Pixmap;

use crate::buffer::ShadowBufferManager;
use crate::compositor;
use crate::config::{ConfigChanges, ShadowConfig};

/// A CSS-like shadow cast behind arbitrary host content.
///
/// This is the surface the host's UI layer talks to: it forwards layout,
/// attach/detach and draw callbacks, and sets shadow properties. Everything
/// is single-threaded and driven by the host's draw cycle.
pub struct ShadowLayer {
    config: ShadowConfig,
    buffers: ShadowBufferManager,
    backend: Box<dyn BlurBackend>,
    scale_factor: ScaleFactor,
    bounds: SizeI32,
    attached: bool,
    redraw_requested: bool,
}

impl ShadowLayer {
    /// Creates a layer with the software blur backend.
    ///
    /// `scale_factor` is the host display's device-to-logical pixel ratio,
    /// resolved once at startup (1.0 when no display exists).
    #[cfg(feature = "software")]
    pub fn new(scale_factor: ScaleFactor) -> Self {
        Self::with_backend(scale_factor, Box::new(shadowvg_blur::BoxBlurBackend))
    }

    pub fn with_backend(scale_factor: ScaleFactor, backend: Box<dyn BlurBackend>) -> Self {
        Self {
            config: ShadowConfig::default(),
            buffers: ShadowBufferManager::new(),
            backend,
            scale_factor,
            bounds: SizeI32::new(0, 0),
            attached: false,
            redraw_requested: false,
        }
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn scale_factor(&self) -> ScaleFactor {
        self.scale_factor
    }

    pub fn bounds(&self) -> SizeI32 {
        self.bounds
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns and clears the pending redraw request. Hosts poll this after
    /// changing properties to decide whether to schedule a draw.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Host layout callback.
    pub fn on_size_changed(&mut self, width: i32, height: i32) {
        self.bounds = SizeI32::new(width, height);
        if self.attached {
            self.ensure_eagerly();
        }
        self.redraw_requested = true;
    }

    /// Host attach callback: the buffer is (re)acquired eagerly so the
    /// first draw does not pay for allocation.
    pub fn on_attached(&mut self) {
        self.attached = true;
        self.ensure_eagerly();
    }

    /// Host detach callback: releases the buffer and blur handle.
    pub fn on_detached(&mut self) {
        self.attached = false;
        self.buffers.destroy();
    }

    /// Host draw callback: runs the shadow pipeline once onto `target`.
    ///
    /// Failures degrade to a frame without a shadow; nothing propagates to
    /// the host.
    pub fn on_draw_requested(&mut self, target: &mut Pixmap, source: &dyn RenderSource) {
        self.redraw_requested = false;
        compositor::render_frame(
            &self.config,
            self.bounds,
            self.scale_factor,
            &mut self.buffers,
            self.backend.as_ref(),
            source,
            target,
        );
    }

    pub fn set_color(&mut self, color: RGBA8) {
        let changes = self.config.set_color(color);
        self.apply_changes(changes);
    }

    pub fn set_radius(&mut self, radius: f32) {
        let changes = self.config.set_radius(radius);
        self.apply_changes(changes);
    }

    pub fn set_x_shift(&mut self, x_shift: f32) {
        let changes = self.config.set_x_shift(x_shift);
        self.apply_changes(changes);
    }

    pub fn set_y_shift(&mut self, y_shift: f32) {
        let changes = self.config.set_y_shift(y_shift);
        self.apply_changes(changes);
    }

    pub fn set_downscale(&mut self, downscale: f32) {
        let changes = self.config.set_downscale(downscale);
        self.apply_changes(changes);
    }

    pub fn set_with_color(&mut self, with_color: bool) {
        let changes = self.config.set_with_color(with_color);
        self.apply_changes(changes);
    }

    pub fn set_with_dpi_scale(&mut self, with_dpi_scale: bool) {
        let changes = self.config.set_with_dpi_scale(with_dpi_scale);
        self.apply_changes(changes);
    }

    pub fn set_with_css_scale(&mut self, with_css_scale: bool) {
        let changes = self.config.set_with_css_scale(with_css_scale);
        self.apply_changes(changes);
    }

    pub fn set_with_content(&mut self, with_content: bool) {
        let changes = self.config.set_with_content(with_content);
        self.apply_changes(changes);
    }

    pub fn set_cast_background_only(&mut self, cast_background_only: bool) {
        let changes = self.config.set_cast_background_only(cast_background_only);
        self.apply_changes(changes);
    }

    /// Translates a reported configuration change into buffer invalidation
    /// and redraw scheduling.
    fn apply_changes(&mut self, changes: ConfigChanges) {
        if changes.intersects(ConfigChanges::REALLOC) {
            self.buffers.invalidate();
            if self.attached {
                self.ensure_eagerly();
            }
        }
        if changes.intersects(ConfigChanges::REDRAW) {
            self.redraw_requested = true;
        }
    }

    fn ensure_eagerly(&mut self) {
        if let Err(err) = self
            .buffers
            .ensure_buffer(&self.config, self.bounds, self.scale_factor)
        {
            warn!("shadow buffer unavailable: {err}");
        }
    }

    #[cfg(test)]
    pub(crate) fn buffers(&self) -> &ShadowBufferManager {
        &self.buffers
    }
}
