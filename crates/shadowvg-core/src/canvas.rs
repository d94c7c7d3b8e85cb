//! A minimal software raster target.
//!
//! The transforms produced by this library are scale + translate only, so
//! the canvas assumes axis-aligned geometry when filling rectangles.

use crate::color::PackedRgba;
use crate::math::{Point, Rect, Transform};
use crate::pixmap::{Pixmap, PixmapFormat};

/// Host content that can cast a shadow.
///
/// Implementations draw themselves with whatever transform the canvas
/// carries: once shrunk into the blur buffer, and once at identity onto the
/// final surface.
pub trait RenderSource {
    /// Draws the full content tree.
    fn render(&self, canvas: &mut Canvas<'_>);

    /// Draws only the background shape, positioned at `bounds`.
    ///
    /// The default draws nothing, which models a container without a
    /// background shape.
    fn render_background(&self, canvas: &mut Canvas<'_>, bounds: Rect) {
        let _ = (canvas, bounds);
    }
}

/// A drawing target wrapping a mutable [`Pixmap`] and a current transform.
pub struct Canvas<'a> {
    target: &'a mut Pixmap,
    transform: Transform,
}

impl<'a> Canvas<'a> {
    /// A canvas with the identity transform.
    pub fn new(target: &'a mut Pixmap) -> Self {
        Self {
            target,
            transform: Transform::identity(),
        }
    }

    pub fn with_transform(target: &'a mut Pixmap, transform: Transform) -> Self {
        Self { target, transform }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn target(&self) -> &Pixmap {
        self.target
    }

    /// Fills an axis-aligned rectangle, mapped through the current
    /// transform, with source-over blending.
    ///
    /// On `Alpha8` targets only the coverage (alpha) channel is written.
    pub fn fill_rect(&mut self, rect: Rect, color: PackedRgba) {
        let p0 = self.transform.transform_point(rect.origin);
        let p1 = self
            .transform
            .transform_point(rect.origin + rect.size.to_vector());

        let width = self.target.width() as f32;
        let height = self.target.height() as f32;
        let x0 = p0.x.min(p1.x).round().clamp(0.0, width) as u32;
        let x1 = p0.x.max(p1.x).round().clamp(0.0, width) as u32;
        let y0 = p0.y.min(p1.y).round().clamp(0.0, height) as u32;
        let y1 = p0.y.max(p1.y).round().clamp(0.0, height) as u32;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src = color.premultiplied();
        let sa = src[3];
        match self.target.format() {
            PixmapFormat::Alpha8 => {
                for y in y0..y1 {
                    let row = self.target.row_mut(y);
                    for px in &mut row[x0 as usize..x1 as usize] {
                        let da = *px as f32 / 255.0;
                        *px = to_byte(sa + da * (1.0 - sa));
                    }
                }
            }
            PixmapFormat::Rgba8 => {
                for y in y0..y1 {
                    let row = self.target.row_mut(y);
                    for px in row[x0 as usize * 4..x1 as usize * 4].chunks_exact_mut(4) {
                        for (channel, s) in px.iter_mut().zip(src) {
                            let d = *channel as f32 / 255.0;
                            *channel = to_byte(s + d * (1.0 - sa));
                        }
                    }
                }
            }
        }
    }

    /// Composites `src` onto the target under the current transform with
    /// bilinear sampling and source-over blending.
    ///
    /// For `Alpha8` sources `tint` supplies the shadow's RGBA; for `Rgba8`
    /// sources the tint's alpha modulates the overall opacity.
    pub fn draw_pixmap(&mut self, src: &Pixmap, tint: PackedRgba) {
        let Some(inverse) = self.transform.inverse() else {
            return;
        };

        // Destination bounding box of the transformed source rect.
        let p0 = self.transform.transform_point(Point::new(0.0, 0.0));
        let p1 = self
            .transform
            .transform_point(Point::new(src.width() as f32, src.height() as f32));

        let width = self.target.width() as f32;
        let height = self.target.height() as f32;
        let x0 = p0.x.min(p1.x).floor().clamp(0.0, width) as u32;
        let x1 = p0.x.max(p1.x).ceil().clamp(0.0, width) as u32;
        let y0 = p0.y.min(p1.y).floor().clamp(0.0, height) as u32;
        let y1 = p0.y.max(p1.y).ceil().clamp(0.0, height) as u32;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let tint_premul = tint.premultiplied();
        let tint_alpha = tint.a();
        let src_is_mask = src.format() == PixmapFormat::Alpha8;
        let dst_format = self.target.format();

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let sampled = sample_bilinear(src, inverse.transform_point(center));

                // Apply the tint in premultiplied space.
                let s = if src_is_mask {
                    let coverage = sampled[3];
                    [
                        tint_premul[0] * coverage,
                        tint_premul[1] * coverage,
                        tint_premul[2] * coverage,
                        tint_premul[3] * coverage,
                    ]
                } else {
                    sampled.map(|c| c * tint_alpha)
                };
                if s[3] <= 0.0 && s[0] <= 0.0 && s[1] <= 0.0 && s[2] <= 0.0 {
                    continue;
                }

                let sa = s[3];
                let bpp = dst_format.bytes_per_pixel();
                let row = self.target.row_mut(y);
                let idx = x as usize * bpp;
                match dst_format {
                    PixmapFormat::Rgba8 => {
                        for (channel, sc) in row[idx..idx + 4].iter_mut().zip(s) {
                            let d = *channel as f32 / 255.0;
                            *channel = to_byte(sc + d * (1.0 - sa));
                        }
                    }
                    PixmapFormat::Alpha8 => {
                        let d = row[idx] as f32 / 255.0;
                        row[idx] = to_byte(sa + d * (1.0 - sa));
                    }
                }
            }
        }
    }
}

/// Bilinear sample at a position in source pixel space, returning
/// premultiplied RGBA. Taps outside the pixmap read as transparent.
fn sample_bilinear(src: &Pixmap, pos: Point) -> [f32; 4] {
    let sx = pos.x - 0.5;
    let sy = pos.y - 0.5;
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let x0 = x0 as i32;
    let y0 = y0 as i32;

    let t00 = src.fetch(x0, y0);
    let t10 = src.fetch(x0 + 1, y0);
    let t01 = src.fetch(x0, y0 + 1);
    let t11 = src.fetch(x0 + 1, y0 + 1);

    let mut out = [0.0; 4];
    for c in 0..4 {
        let top = t00[c] * (1.0 - fx) + t10[c] * fx;
        let bottom = t01[c] * (1.0 - fx) + t11[c] * fx;
        out[c] = top * (1.0 - fy) + bottom * fy;
    }
    out
}

#[inline]
fn to_byte(value: f32) -> u8 {
    (value * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{rect, Transform};

    #[test]
    fn fill_rect_writes_coverage_on_alpha8() {
        let mut pixmap = Pixmap::new(4, 4, PixmapFormat::Alpha8).unwrap();
        let mut canvas = Canvas::new(&mut pixmap);
        canvas.fill_rect(rect(1.0, 1.0, 2.0, 2.0), PackedRgba::new(1.0, 0.0, 0.0, 1.0));

        assert_eq!(pixmap.row(0), &[0, 0, 0, 0]);
        assert_eq!(pixmap.row(1), &[0, 255, 255, 0]);
        assert_eq!(pixmap.row(2), &[0, 255, 255, 0]);
        assert_eq!(pixmap.row(3), &[0, 0, 0, 0]);
    }

    #[test]
    fn fill_rect_respects_transform() {
        let mut pixmap = Pixmap::new(4, 4, PixmapFormat::Alpha8).unwrap();
        let transform = Transform::scale(0.5, 0.5).then_translate(crate::math::vector(1.0, 1.0));
        let mut canvas = Canvas::with_transform(&mut pixmap, transform);
        // 4x4 rect shrunk to 2x2 and nudged inward.
        canvas.fill_rect(rect(0.0, 0.0, 4.0, 4.0), PackedRgba::BLACK);

        assert_eq!(pixmap.row(0), &[0, 0, 0, 0]);
        assert_eq!(pixmap.row(1), &[0, 255, 255, 0]);
        assert_eq!(pixmap.row(2), &[0, 255, 255, 0]);
        assert_eq!(pixmap.row(3), &[0, 0, 0, 0]);
    }

    #[test]
    fn fill_rect_blends_source_over() {
        let mut pixmap = Pixmap::new(1, 1, PixmapFormat::Rgba8).unwrap();
        let mut canvas = Canvas::new(&mut pixmap);
        canvas.fill_rect(rect(0.0, 0.0, 1.0, 1.0), PackedRgba::new(1.0, 0.0, 0.0, 1.0));
        canvas.fill_rect(rect(0.0, 0.0, 1.0, 1.0), PackedRgba::new(0.0, 0.0, 1.0, 0.5));

        // Premultiplied: half blue over solid red.
        assert_eq!(pixmap.row(0), &[128, 0, 128, 255]);
    }

    #[test]
    fn draw_pixmap_tints_alpha_mask() {
        let mut mask = Pixmap::new(2, 2, PixmapFormat::Alpha8).unwrap();
        mask.data_mut().fill(255);

        let mut target = Pixmap::new(2, 2, PixmapFormat::Rgba8).unwrap();
        let mut canvas = Canvas::new(&mut target);
        canvas.draw_pixmap(&mask, PackedRgba::new(0.0, 1.0, 0.0, 1.0));

        assert_eq!(&target.row(0)[..4], &[0, 255, 0, 255]);
        assert_eq!(&target.row(1)[4..], &[0, 255, 0, 255]);
    }

    #[test]
    fn draw_pixmap_tint_alpha_modulates_rgba_source() {
        let mut src = Pixmap::new(1, 1, PixmapFormat::Rgba8).unwrap();
        src.data_mut().copy_from_slice(&[255, 0, 0, 255]);

        let mut target = Pixmap::new(1, 1, PixmapFormat::Rgba8).unwrap();
        let mut canvas = Canvas::new(&mut target);
        canvas.draw_pixmap(&src, PackedRgba::new(1.0, 1.0, 1.0, 0.5));

        let row = target.row(0);
        assert!((row[0] as i32 - 128).abs() <= 1);
        assert_eq!(row[1], 0);
        assert!((row[3] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn draw_pixmap_transparent_source_is_noop() {
        let src = Pixmap::new(8, 8, PixmapFormat::Alpha8).unwrap();
        let mut target = Pixmap::new(8, 8, PixmapFormat::Rgba8).unwrap();
        target.data_mut().fill(40);
        let before = target.data().to_vec();

        let mut canvas = Canvas::new(&mut target);
        canvas.draw_pixmap(&src, PackedRgba::BLACK);
        assert_eq!(target.data(), &before[..]);
    }
}
