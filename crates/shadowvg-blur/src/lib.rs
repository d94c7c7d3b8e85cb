//! Software blur backend for ShadowVG.
//!
//! A separable sliding-window box blur run as three successive passes per
//! axis, the classic approximation of a Gaussian. Pixels outside the pixmap
//! read as transparent, which is what lets a shadow silhouette spread into
//! the margin reserved around it.

use shadowvg_core::blur::{BlurBackend, BlurError, BlurHandle, MAX_BLUR_RADIUS};
use shadowvg_core::pixmap::{Pixmap, PixmapFormat};

/// A box-blur handle bound to one pixel format.
///
/// The scratch buffer is reused across frames, so blurring is
/// allocation-free after the first call at a given size.
pub struct BoxBlur {
    format: PixmapFormat,
    scratch: Vec<u8>,
}

impl BoxBlur {
    pub fn new(format: PixmapFormat) -> Self {
        Self {
            format,
            scratch: Vec::new(),
        }
    }
}

impl BlurHandle for BoxBlur {
    fn format(&self) -> PixmapFormat {
        self.format
    }

    fn blur(&mut self, pixmap: &mut Pixmap, radius: f32) -> Result<(), BlurError> {
        if pixmap.format() != self.format {
            return Err(BlurError::FormatMismatch {
                pixmap: pixmap.format(),
                handle: self.format,
            });
        }
        let radius = radius.clamp(0.0, MAX_BLUR_RADIUS);
        if radius <= 0.0 {
            return Ok(());
        }

        let width = pixmap.width() as usize;
        let height = pixmap.height() as usize;
        let channels = pixmap.bytes_per_pixel();
        self.scratch.resize(width * height * channels, 0);

        // Three box passes with sigma = radius / 3 keeps the visible spread
        // (~3 sigma) at the radius itself, which in turn stays inside the
        // margin reserved for MAX_BLUR_RADIUS.
        let sigma = radius / 3.0;
        let data = pixmap.data_mut();
        for box_radius in box_radii_for_gaussian(sigma) {
            if box_radius == 0 {
                continue;
            }
            box_pass_horizontal(data, &mut self.scratch, width, height, channels, box_radius);
            box_pass_vertical(&self.scratch, data, width, height, channels, box_radius);
        }

        Ok(())
    }
}

/// Software [`BlurBackend`] producing [`BoxBlur`] handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoxBlurBackend;

impl BlurBackend for BoxBlurBackend {
    fn create_handle(&self, format: PixmapFormat) -> Result<Box<dyn BlurHandle>, BlurError> {
        Ok(Box::new(BoxBlur::new(format)))
    }
}

/// The three box radii approximating a Gaussian of the given sigma.
///
/// Standard boxes-for-Gaussian subdivision: box widths are the two odd
/// sizes bracketing the ideal width, split so the combined variance matches.
fn box_radii_for_gaussian(sigma: f32) -> [usize; 3] {
    const N: f32 = 3.0;
    let ideal_width = (12.0 * sigma * sigma / N + 1.0).sqrt();
    let mut lower = ideal_width.floor() as i32;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;

    let ideal_passes = (12.0 * sigma * sigma
        - N * (lower * lower) as f32
        - 4.0 * N * lower as f32
        - 3.0 * N)
        / (-4.0 * lower as f32 - 4.0);
    let split = ideal_passes.round() as i32;

    let mut radii = [0usize; 3];
    for (i, radius) in radii.iter_mut().enumerate() {
        let width = if (i as i32) < split { lower } else { upper };
        *radius = ((width - 1) / 2).max(0) as usize;
    }
    radii
}

/// One horizontal box pass with zero (transparent) padding at the edges.
fn box_pass_horizontal(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    radius: usize,
) {
    let div = (2 * radius + 1) as u32;
    let stride = width * channels;
    for y in 0..height {
        let row = y * stride;
        for c in 0..channels {
            let mut sum: u32 = 0;
            for x in 0..(radius + 1).min(width) {
                sum += src[row + x * channels + c] as u32;
            }
            for x in 0..width {
                dst[row + x * channels + c] = ((sum + div / 2) / div) as u8;
                let add = x + radius + 1;
                if add < width {
                    sum += src[row + add * channels + c] as u32;
                }
                if x >= radius {
                    sum -= src[row + (x - radius) * channels + c] as u32;
                }
            }
        }
    }
}

/// One vertical box pass with zero (transparent) padding at the edges.
fn box_pass_vertical(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    radius: usize,
) {
    let div = (2 * radius + 1) as u32;
    let stride = width * channels;
    for x in 0..width {
        for c in 0..channels {
            let col = x * channels + c;
            let mut sum: u32 = 0;
            for y in 0..(radius + 1).min(height) {
                sum += src[y * stride + col] as u32;
            }
            for y in 0..height {
                dst[y * stride + col] = ((sum + div / 2) / div) as u8;
                let add = y + radius + 1;
                if add < height {
                    sum += src[add * stride + col] as u32;
                }
                if y >= radius {
                    sum -= src[(y - radius) * stride + col] as u32;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(size: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(size, size, PixmapFormat::Alpha8).unwrap();
        let center = size as usize / 2;
        pixmap.data_mut()[center * size as usize + center] = 255;
        pixmap
    }

    #[test]
    fn format_mismatch_is_an_error() {
        let mut handle = BoxBlur::new(PixmapFormat::Alpha8);
        let mut pixmap = Pixmap::new(4, 4, PixmapFormat::Rgba8).unwrap();
        assert!(matches!(
            handle.blur(&mut pixmap, 5.0),
            Err(BlurError::FormatMismatch { .. })
        ));
    }

    #[test]
    fn impulse_spreads_symmetrically() {
        let mut pixmap = impulse(31);
        let mut handle = BoxBlur::new(PixmapFormat::Alpha8);
        handle.blur(&mut pixmap, 6.0).unwrap();

        let w = pixmap.width() as usize;
        let c = w / 2;
        let at = |x: usize, y: usize| pixmap.data()[y * w + x];

        assert!(at(c, c) < 255);
        assert!(at(c + 3, c) > 0);
        assert_eq!(at(c + 3, c), at(c - 3, c));
        assert_eq!(at(c, c + 3), at(c, c - 3));
        // Horizontal and vertical passes round independently, so the two
        // axes may differ by a quantization step.
        assert!((at(c + 3, c) as i32 - at(c, c + 3) as i32).abs() <= 2);
    }

    #[test]
    fn larger_radius_spreads_further() {
        let mut small = impulse(61);
        let mut large = impulse(61);
        let mut handle = BoxBlur::new(PixmapFormat::Alpha8);
        handle.blur(&mut small, 4.0).unwrap();
        handle.blur(&mut large, 20.0).unwrap();

        let w = 61usize;
        let c = w / 2;
        assert!(small.data()[c * w + c] > large.data()[c * w + c]);
    }

    #[test]
    fn spread_stays_within_max_radius_margin() {
        let mut pixmap = impulse(61);
        let mut handle = BoxBlur::new(PixmapFormat::Alpha8);
        handle.blur(&mut pixmap, MAX_BLUR_RADIUS).unwrap();

        let w = 61usize;
        let c = w / 2;
        // Beyond 25 pixels from the impulse everything must still be zero.
        assert_eq!(pixmap.data()[c * w], 0);
        assert_eq!(pixmap.data()[c * w + w - 1], 0);
    }

    #[test]
    fn rgba_blurs_all_channels() {
        let mut pixmap = Pixmap::new(9, 9, PixmapFormat::Rgba8).unwrap();
        let idx = (4 * 9 + 4) * 4;
        pixmap.data_mut()[idx..idx + 4].copy_from_slice(&[255, 128, 0, 255]);

        let mut handle = BoxBlur::new(PixmapFormat::Rgba8);
        handle.blur(&mut pixmap, 3.0).unwrap();

        let neighbor = (4 * 9 + 5) * 4;
        let data = pixmap.data();
        assert!(data[neighbor] > 0);
        assert!(data[neighbor + 1] > 0);
        assert_eq!(data[neighbor + 2], 0);
        assert!(data[neighbor + 3] > 0);
    }
}
