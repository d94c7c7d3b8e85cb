//! The per-frame pipeline: erase the shadow buffer, render the silhouette
//! into it, blur, composite onto the target surface, then draw the content
//! on top.

use log::warn;

use shadowvg_core::blur::BlurBackend;
use shadowvg_core::canvas::{Canvas, RenderSource};
use shadowvg_core::math::{rect, ScaleFactor, SizeI32};
use shadowvg_core::pixmap::Pixmap;

use crate::buffer::ShadowBufferManager;
use crate::config::ShadowConfig;
use crate::geometry::ShadowGeometry;

/// Runs one frame of the shadow pipeline.
///
/// Never fails the host: buffer or blur failures degrade to a frame with
/// the shadow omitted and the content still drawn.
pub fn render_frame(
    config: &ShadowConfig,
    bounds: SizeI32,
    scale_factor: ScaleFactor,
    buffers: &mut ShadowBufferManager,
    backend: &dyn BlurBackend,
    source: &dyn RenderSource,
    target: &mut Pixmap,
) {
    let acquired = match buffers.ensure_buffer(config, bounds, scale_factor) {
        Ok(pixmap) => pixmap.is_some(),
        Err(err) => {
            warn!("skipping shadow this frame: {err}");
            false
        }
    };

    if acquired {
        let geometry = ShadowGeometry::new(config, scale_factor);

        // The buffer is reused across frames with different content, so it
        // must be erased before the silhouette is rendered.
        if let Some(pixmap) = buffers.pixmap_mut() {
            pixmap.clear();
            let mut canvas = Canvas::with_transform(pixmap, geometry.buffer_transform());
            if config.cast_background_only() {
                source.render_background(
                    &mut canvas,
                    rect(0.0, 0.0, bounds.width as f32, bounds.height as f32),
                );
            } else {
                source.render(&mut canvas);
            }
        }

        // Do not blur if there is no radius.
        let radius = config.effective_radius();
        let blurred = if radius > 0.0 {
            match buffers.blur(backend, config.with_color(), radius) {
                Ok(()) => true,
                Err(err) => {
                    warn!("skipping shadow this frame: {err}");
                    false
                }
            }
        } else {
            true
        };

        if blurred {
            if let Some(pixmap) = buffers.pixmap() {
                let mut canvas = Canvas::with_transform(target, geometry.draw_transform());
                canvas.draw_pixmap(pixmap, config.color().into());
            }
        }
    }

    if config.with_content() {
        source.render(&mut Canvas::new(target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use shadowvg_core::blur::{BlurError, BlurHandle};
    use shadowvg_core::color::PackedRgba;
    use shadowvg_core::math::Rect;
    use shadowvg_core::pixmap::PixmapFormat;

    /// Backend whose handles count their blur invocations.
    #[derive(Default, Clone)]
    struct CountingBackend {
        blur_calls: Rc<Cell<usize>>,
        handles_created: Rc<Cell<usize>>,
    }

    struct CountingHandle {
        format: PixmapFormat,
        blur_calls: Rc<Cell<usize>>,
    }

    impl BlurHandle for CountingHandle {
        fn format(&self) -> PixmapFormat {
            self.format
        }

        fn blur(&mut self, _pixmap: &mut Pixmap, _radius: f32) -> Result<(), BlurError> {
            self.blur_calls.set(self.blur_calls.get() + 1);
            Ok(())
        }
    }

    impl BlurBackend for CountingBackend {
        fn create_handle(&self, format: PixmapFormat) -> Result<Box<dyn BlurHandle>, BlurError> {
            self.handles_created.set(self.handles_created.get() + 1);
            Ok(Box::new(CountingHandle {
                format,
                blur_calls: self.blur_calls.clone(),
            }))
        }
    }

    /// Backend that can never construct a handle.
    struct BrokenBackend;

    impl BlurBackend for BrokenBackend {
        fn create_handle(&self, format: PixmapFormat) -> Result<Box<dyn BlurHandle>, BlurError> {
            Err(BlurError::Unavailable(format))
        }
    }

    /// Content filling its whole bounds, counting render calls.
    struct SolidContent {
        size: SizeI32,
        renders: Cell<usize>,
        background: Option<PackedRgba>,
    }

    impl SolidContent {
        fn new(size: SizeI32) -> Self {
            Self {
                size,
                renders: Cell::new(0),
                background: None,
            }
        }
    }

    impl RenderSource for SolidContent {
        fn render(&self, canvas: &mut Canvas<'_>) {
            self.renders.set(self.renders.get() + 1);
            canvas.fill_rect(
                rect(0.0, 0.0, self.size.width as f32, self.size.height as f32),
                PackedRgba::new(1.0, 0.0, 0.0, 1.0),
            );
        }

        fn render_background(&self, canvas: &mut Canvas<'_>, bounds: Rect) {
            if let Some(color) = self.background {
                canvas.fill_rect(bounds, color);
            }
        }
    }

    fn frame(
        config: &ShadowConfig,
        bounds: SizeI32,
        buffers: &mut ShadowBufferManager,
        backend: &dyn BlurBackend,
        source: &SolidContent,
    ) -> Pixmap {
        let mut target = Pixmap::new(
            bounds.width.max(1) as u32,
            bounds.height.max(1) as u32,
            PixmapFormat::Rgba8,
        )
        .unwrap();
        render_frame(
            config,
            bounds,
            ScaleFactor::default(),
            buffers,
            backend,
            source,
            &mut target,
        );
        target
    }

    #[test]
    fn zero_radius_never_invokes_blur() {
        let mut config = ShadowConfig::default();
        config.set_radius(0.0);
        let backend = CountingBackend::default();
        let mut buffers = ShadowBufferManager::new();
        let bounds = SizeI32::new(40, 30);
        let source = SolidContent::new(bounds);

        frame(&config, bounds, &mut buffers, &backend, &source);
        assert_eq!(backend.blur_calls.get(), 0);

        config.set_radius(5.0);
        frame(&config, bounds, &mut buffers, &backend, &source);
        assert_eq!(backend.blur_calls.get(), 1);
    }

    #[test]
    fn empty_bounds_draw_content_only() {
        let config = ShadowConfig::default();
        let backend = CountingBackend::default();
        let mut buffers = ShadowBufferManager::new();
        let source = SolidContent::new(SizeI32::new(0, 0));

        frame(&config, SizeI32::new(0, 0), &mut buffers, &backend, &source);

        assert_eq!(source.renders.get(), 1);
        assert_eq!(backend.blur_calls.get(), 0);
        assert_eq!(backend.handles_created.get(), 0);
        assert_eq!(buffers.allocations(), 0);
    }

    #[test]
    fn content_is_skipped_when_disabled() {
        let mut config = ShadowConfig::default();
        config.set_with_content(false);
        let backend = CountingBackend::default();
        let mut buffers = ShadowBufferManager::new();
        let bounds = SizeI32::new(20, 20);
        let source = SolidContent::new(bounds);

        frame(&config, bounds, &mut buffers, &backend, &source);
        // Rendered once into the shadow buffer, never onto the target.
        assert_eq!(source.renders.get(), 1);
    }

    #[test]
    fn cast_background_only_without_background_is_blank() {
        let mut config = ShadowConfig::default();
        config.set_cast_background_only(true);
        config.set_with_content(false);
        config.set_radius(6.0);
        let backend = CountingBackend::default();
        let mut buffers = ShadowBufferManager::new();
        let bounds = SizeI32::new(30, 30);
        let source = SolidContent::new(bounds);

        let target = frame(&config, bounds, &mut buffers, &backend, &source);

        // Nothing was drawn into the buffer, the blur still ran, and the
        // composited result is an invisible shadow.
        assert!(buffers.pixmap().unwrap().is_blank());
        assert_eq!(backend.blur_calls.get(), 1);
        assert!(target.is_blank());
        assert_eq!(source.renders.get(), 0);
    }

    #[test]
    fn shadow_appears_behind_content() {
        let mut config = ShadowConfig::default();
        config.set_with_dpi_scale(false);
        config.set_with_css_scale(false);
        config.set_radius(10.0);
        config.set_color(shadowvg_core::color::RGBA8 {
            r: 0,
            g: 0,
            b: 255,
            a: 255,
        });
        let backend = shadowvg_blur::BoxBlurBackend;
        let mut buffers = ShadowBufferManager::new();
        let bounds = SizeI32::new(40, 40);
        let source = SolidContent::new(bounds);

        let mut target = Pixmap::new(60, 60, PixmapFormat::Rgba8).unwrap();
        render_frame(
            &config,
            bounds,
            ScaleFactor::default(),
            &mut buffers,
            &backend,
            &source,
            &mut target,
        );

        // Inside the content rect: opaque red content on top.
        let inside = target.fetch(20, 20);
        assert!(inside[0] > 0.9 && inside[3] > 0.9);
        // Just outside the content rect: blue blur spill.
        let spill = target.fetch(45, 20);
        assert!(spill[3] > 0.0, "expected blur spill outside the content");
        assert!(spill[2] > 0.0);
        assert_eq!(spill[0], 0.0);
    }

    #[test]
    fn broken_blur_backend_degrades_to_content_only() {
        let mut config = ShadowConfig::default();
        config.set_radius(10.0);
        let mut buffers = ShadowBufferManager::new();
        let bounds = SizeI32::new(25, 25);
        let source = SolidContent::new(bounds);

        let target = frame(&config, bounds, &mut buffers, &BrokenBackend, &source);

        // The shadow is omitted but the content still shows.
        assert!(!target.is_blank());
        assert_eq!(source.renders.get(), 2);
        let corner = target.fetch(0, 0);
        assert!(corner[0] > 0.9, "content must be drawn untinted");
    }
}
