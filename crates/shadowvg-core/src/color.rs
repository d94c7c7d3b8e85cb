//! This module re-exports the types from the [`rgb`](https://crates.io/crates/rgb) crate.

pub use rgb::*;

/// The color black with full opacity
pub const BLACK: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 255,
};

/// A color with no opacity
pub const TRANSPARENT: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

/// The default shadow color: black at 20% opacity (`0x33 << 24` in ARGB).
pub const DEFAULT_SHADOW: RGBA8 = RGBA8 {
    r: 0,
    g: 0,
    b: 0,
    a: 51,
};

/// A color packed as 4 floats representing straight (non-premultiplied)
/// RGBA channels in the `0.0..=1.0` range.
#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, bytemuck::Zeroable, bytemuck::Pod)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedRgba(pub [f32; 4]);

impl PackedRgba {
    /// The color black with full opacity
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    /// The color white with full opacity
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    /// A color with no opacity
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    pub fn r(&self) -> f32 {
        self.0[0]
    }
    pub fn g(&self) -> f32 {
        self.0[1]
    }
    pub fn b(&self) -> f32 {
        self.0[2]
    }
    pub fn a(&self) -> f32 {
        self.0[3]
    }

    /// Returns the color with the RGB channels multiplied by the alpha
    /// channel, the form used when blending.
    pub fn premultiplied(&self) -> [f32; 4] {
        let [r, g, b, a] = self.0;
        [r * a, g * a, b * a, a]
    }
}

impl From<RGBA8> for PackedRgba {
    fn from(color: RGBA8) -> Self {
        Self([
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            color.a as f32 / 255.0,
        ])
    }
}

impl From<RGB8> for PackedRgba {
    fn from(color: RGB8) -> Self {
        Self([
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            1.0,
        ])
    }
}

impl From<[f32; 4]> for PackedRgba {
    fn from(rgba: [f32; 4]) -> Self {
        Self(rgba)
    }
}

impl From<PackedRgba> for [f32; 4] {
    fn from(color: PackedRgba) -> Self {
        color.0
    }
}
