use shadowvg_core::blur::MAX_BLUR_RADIUS;
use shadowvg_core::color::{self, RGBA8};

bitflags::bitflags! {
    /// The set of configuration fields changed by a setter.
    ///
    /// Setters return these instead of mutating caches behind the caller's
    /// back, so downstream components decide explicitly what a change
    /// invalidates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ConfigChanges: u32 {
        const COLOR                = 0b0_0000_0001;
        const RADIUS               = 0b0_0000_0010;
        const SHIFT                = 0b0_0000_0100;
        const DOWNSCALE            = 0b0_0000_1000;
        const WITH_COLOR           = 0b0_0001_0000;
        const WITH_DPI_SCALE       = 0b0_0010_0000;
        const WITH_CSS_SCALE       = 0b0_0100_0000;
        const WITH_CONTENT         = 0b0_1000_0000;
        const CAST_BACKGROUND_ONLY = 0b1_0000_0000;

        /// Changes that alter the buffer specs and force the buffer (and,
        /// for `WITH_COLOR`, the blur handle) to be recreated before the
        /// next draw.
        const REALLOC = Self::DOWNSCALE.bits()
            | Self::WITH_COLOR.bits()
            | Self::WITH_DPI_SCALE.bits()
            | Self::WITH_CSS_SCALE.bits();

        /// Changes that alter visual output and schedule a redraw.
        const REDRAW = Self::COLOR.bits()
            | Self::RADIUS.bits()
            | Self::SHIFT.bits()
            | Self::DOWNSCALE.bits()
            | Self::WITH_COLOR.bits()
            | Self::WITH_DPI_SCALE.bits()
            | Self::WITH_CSS_SCALE.bits()
            | Self::WITH_CONTENT.bits()
            | Self::CAST_BACKGROUND_ONLY.bits();
    }
}

impl Default for ConfigChanges {
    fn default() -> Self {
        ConfigChanges::empty()
    }
}

/// The configurable shadow parameters.
///
/// Out-of-range values are never rejected; setters silently clamp to the
/// nearest valid value and report what changed as [`ConfigChanges`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowConfig {
    color: RGBA8,
    radius: f32,
    x_shift: f32,
    y_shift: f32,
    downscale: f32,
    with_color: bool,
    with_dpi_scale: bool,
    with_css_scale: bool,
    with_content: bool,
    cast_background_only: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            color: color::DEFAULT_SHADOW,
            radius: 6.0,
            x_shift: 0.0,
            y_shift: 0.0,
            downscale: 1.0,
            with_color: false,
            with_dpi_scale: true,
            with_css_scale: true,
            with_content: true,
            cast_background_only: false,
        }
    }
}

impl ShadowConfig {
    pub fn color(&self) -> RGBA8 {
        self.color
    }

    /// Blur radius in pixels, before the downscale is applied.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn x_shift(&self) -> f32 {
        self.x_shift
    }

    pub fn y_shift(&self) -> f32 {
        self.y_shift
    }

    /// Buffer resolution factor relative to the container size.
    pub fn downscale(&self) -> f32 {
        self.downscale
    }

    /// Whether the shadow buffer keeps the content's colors (4 channels)
    /// instead of an alpha-only silhouette.
    pub fn with_color(&self) -> bool {
        self.with_color
    }

    pub fn with_dpi_scale(&self) -> bool {
        self.with_dpi_scale
    }

    pub fn with_css_scale(&self) -> bool {
        self.with_css_scale
    }

    /// Whether the original content is drawn on top of the shadow.
    pub fn with_content(&self) -> bool {
        self.with_content
    }

    /// Whether the shadow silhouette is the container's background shape
    /// rather than its full rendered content.
    pub fn cast_background_only(&self) -> bool {
        self.cast_background_only
    }

    /// The radius handed to the blur primitive: the configured radius in
    /// buffer pixel units, clamped to what the primitive supports.
    ///
    /// Monotonic non-decreasing in `radius`, non-increasing in `downscale`.
    pub fn effective_radius(&self) -> f32 {
        (self.radius / self.downscale).clamp(0.0, MAX_BLUR_RADIUS)
    }

    pub fn set_color(&mut self, color: RGBA8) -> ConfigChanges {
        if self.color == color {
            return ConfigChanges::empty();
        }
        self.color = color;
        ConfigChanges::COLOR
    }

    pub fn set_radius(&mut self, radius: f32) -> ConfigChanges {
        let radius = radius.max(0.0);
        if self.radius == radius {
            return ConfigChanges::empty();
        }
        self.radius = radius;
        ConfigChanges::RADIUS
    }

    pub fn set_x_shift(&mut self, x_shift: f32) -> ConfigChanges {
        if self.x_shift == x_shift {
            return ConfigChanges::empty();
        }
        self.x_shift = x_shift;
        ConfigChanges::SHIFT
    }

    pub fn set_y_shift(&mut self, y_shift: f32) -> ConfigChanges {
        if self.y_shift == y_shift {
            return ConfigChanges::empty();
        }
        self.y_shift = y_shift;
        ConfigChanges::SHIFT
    }

    pub fn set_downscale(&mut self, downscale: f32) -> ConfigChanges {
        let downscale = downscale.max(0.1);
        if self.downscale == downscale {
            return ConfigChanges::empty();
        }
        self.downscale = downscale;
        ConfigChanges::DOWNSCALE
    }

    pub fn set_with_color(&mut self, with_color: bool) -> ConfigChanges {
        if self.with_color == with_color {
            return ConfigChanges::empty();
        }
        self.with_color = with_color;
        ConfigChanges::WITH_COLOR
    }

    pub fn set_with_dpi_scale(&mut self, with_dpi_scale: bool) -> ConfigChanges {
        if self.with_dpi_scale == with_dpi_scale {
            return ConfigChanges::empty();
        }
        self.with_dpi_scale = with_dpi_scale;
        ConfigChanges::WITH_DPI_SCALE
    }

    pub fn set_with_css_scale(&mut self, with_css_scale: bool) -> ConfigChanges {
        if self.with_css_scale == with_css_scale {
            return ConfigChanges::empty();
        }
        self.with_css_scale = with_css_scale;
        ConfigChanges::WITH_CSS_SCALE
    }

    pub fn set_with_content(&mut self, with_content: bool) -> ConfigChanges {
        if self.with_content == with_content {
            return ConfigChanges::empty();
        }
        self.with_content = with_content;
        ConfigChanges::WITH_CONTENT
    }

    pub fn set_cast_background_only(&mut self, cast_background_only: bool) -> ConfigChanges {
        if self.cast_background_only == cast_background_only {
            return ConfigChanges::empty();
        }
        self.cast_background_only = cast_background_only;
        ConfigChanges::CAST_BACKGROUND_ONLY
    }
}
