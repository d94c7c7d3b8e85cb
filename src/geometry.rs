//! The affine transforms mapping container-space geometry into the
//! margin-padded, downscaled blur buffer and back.
//!
//! The formulas are empirically tuned for visual parity with CSS
//! `box-shadow` and must be kept exact.

use shadowvg_core::blur::MAX_BLUR_RADIUS;
use shadowvg_core::math::{ScaleFactor, SizeI32, Transform, Vector};

use crate::config::ShadowConfig;

/// Empirical constant reconciling the blur primitive's radius units with
/// the visual spread of CSS `box-shadow`.
pub const CSS_RATIO: f64 = 5.0 / 3.0;

/// Stateless per-frame geometry, computed fresh from the configuration and
/// the host's display scale. Cheap to recompute; nothing is cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowGeometry {
    dp_to_px: f64,
    downscale: f64,
    css_ratio: f64,
    x_shift: f64,
    y_shift: f64,
    margin: i32,
}

impl ShadowGeometry {
    pub fn new(config: &ShadowConfig, scale_factor: ScaleFactor) -> Self {
        let dp_to_px = if config.with_dpi_scale() {
            scale_factor.0 as f64
        } else {
            1.0
        };
        let css_ratio = if config.with_css_scale() {
            CSS_RATIO
        } else {
            1.0
        };
        let downscale = config.downscale() as f64;

        // The margin is always sized to the maximum supported radius, not
        // the current one, so the radius can animate without triggering a
        // buffer reallocation.
        let margin = if downscale < 1.0 {
            MAX_BLUR_RADIUS as i32
        } else {
            (MAX_BLUR_RADIUS as f64 * downscale).ceil() as i32
        };

        Self {
            dp_to_px,
            downscale,
            css_ratio,
            x_shift: config.x_shift() as f64,
            y_shift: config.y_shift() as f64,
            margin,
        }
    }

    /// Extra buffer padding (in buffer pixels) reserved on every side so
    /// blur spread is not clipped at the buffer edge.
    pub fn margin(&self) -> i32 {
        self.margin
    }

    /// Maps container-space coordinates into buffer pixel space: content is
    /// shrunk by downscale, CSS ratio and the dpi ratio, then nudged inward
    /// by the margin.
    pub fn buffer_transform(&self) -> Transform {
        let shrink = (self.dp_to_px.recip() / self.downscale / self.css_ratio) as f32;
        let margin = self.margin as f32;
        Transform::scale(shrink, shrink).then_translate(Vector::new(margin, margin))
    }

    /// Maps the blurred buffer back onto the container surface: the
    /// user-requested shift is applied in buffer-scaled units, the buffer is
    /// rescaled up to device pixels, and the margin offset is undone.
    pub fn draw_transform(&self) -> Transform {
        let enlarge = (self.dp_to_px * self.downscale * self.css_ratio) as f32;
        let shift_x = (self.x_shift / self.downscale / self.css_ratio) as f32;
        let shift_y = (self.y_shift / self.downscale / self.css_ratio) as f32;
        let margin_offset = -self.margin as f32 * enlarge;
        Transform::translation(shift_x, shift_y)
            .then_scale(enlarge, enlarge)
            .then_translate(Vector::new(margin_offset, margin_offset))
    }

    /// The buffer dimensions for the given container bounds: the shrunken
    /// bounds plus the margin on every side.
    pub fn buffer_size(&self, bounds: SizeI32) -> SizeI32 {
        let shrink = self.dp_to_px.recip() / self.downscale / self.css_ratio;
        let width = (bounds.width as f64 * shrink).ceil() as i32 + self.margin * 2;
        let height = (bounds.height as f64 * shrink).ceil() as i32 + self.margin * 2;
        SizeI32::new(width, height)
    }
}
