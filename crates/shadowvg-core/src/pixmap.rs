//! The offscreen pixel buffer that shadow silhouettes are rendered into
//! and blurred in place.

/// Pixmaps larger than this in either dimension are rejected as allocation
/// errors rather than attempted.
pub const MAX_PIXMAP_DIM: u32 = 1 << 15;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PixmapError {
    #[error("invalid pixmap dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("pixmap allocation of {bytes} bytes failed")]
    OutOfMemory { bytes: usize },
}

/// The pixel format of a [`Pixmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixmapFormat {
    /// Four channels, premultiplied alpha.
    Rgba8,
    /// A single coverage channel.
    Alpha8,
}

impl PixmapFormat {
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            PixmapFormat::Rgba8 => 4,
            PixmapFormat::Alpha8 => 1,
        }
    }
}

/// An owned CPU-side pixel buffer.
///
/// `Rgba8` pixmaps store premultiplied alpha so that all four channels can
/// be blurred together.
#[derive(Debug, Clone)]
pub struct Pixmap {
    width: u32,
    height: u32,
    format: PixmapFormat,
    data: Vec<u8>,
}

impl Pixmap {
    /// Allocates a fully transparent pixmap.
    ///
    /// Allocation is all-or-nothing: on failure no partially constructed
    /// buffer is left behind.
    pub fn new(width: u32, height: u32, format: PixmapFormat) -> Result<Self, PixmapError> {
        if width == 0 || height == 0 || width > MAX_PIXMAP_DIM || height > MAX_PIXMAP_DIM {
            return Err(PixmapError::InvalidDimensions { width, height });
        }

        let bytes = width as usize * height as usize * format.bytes_per_pixel();
        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| PixmapError::OutOfMemory { bytes })?;
        data.resize(bytes, 0);

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixmapFormat {
        self.format
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// The row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Erases the whole pixmap to fully transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Returns `true` if every byte is zero (fully transparent).
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Fetches the premultiplied RGBA value of a texel, or transparent when
    /// the coordinates fall outside the pixmap.
    ///
    /// `Alpha8` texels are reported as black coverage.
    pub fn fetch(&self, x: i32, y: i32) -> [f32; 4] {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return [0.0; 4];
        }
        let bpp = self.format.bytes_per_pixel();
        let idx = (y as usize * self.width as usize + x as usize) * bpp;
        match self.format {
            PixmapFormat::Rgba8 => [
                self.data[idx] as f32 / 255.0,
                self.data[idx + 1] as f32 / 255.0,
                self.data[idx + 2] as f32 / 255.0,
                self.data[idx + 3] as f32 / 255.0,
            ],
            PixmapFormat::Alpha8 => {
                let a = self.data[idx] as f32 / 255.0;
                [0.0, 0.0, 0.0, a]
            }
        }
    }
}
