use crate::FrameError;

/// Borrowed BGR frame: row-major, 3 bytes per pixel, `len = w*h*3`.
#[derive(Clone, Copy, Debug)]
pub struct BgrImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

impl<'a> BgrImageView<'a> {
    /// Wrap a raw BGR buffer, checking its length against the dimensions.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::InvalidDimensions { width, height });
        }
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Non-empty, with a buffer matching the dimensions.
    ///
    /// Always true for views built through [`BgrImageView::new`].
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self
                .width
                .checked_mul(self.height)
                .and_then(|n| n.checked_mul(3))
                == Some(self.data.len())
    }

    /// `[b, g, r]` at integer pixel coordinates. Caller guarantees bounds.
    #[inline]
    pub fn bgr(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    fn channel_sum_i(&self, x: i32, y: i32) -> Option<f32> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let [b, g, r] = self.bgr(x as usize, y as usize);
        Some(b as f32 + g as f32 + r as f32)
    }
}

/// Owned BGR frame.
#[derive(Clone, Debug)]
pub struct BgrImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl BgrImage {
    /// Frame filled with a single colour.
    pub fn filled(width: usize, height: usize, bgr: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&bgr);
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn put(&mut self, x: usize, y: usize, bgr: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&bgr);
    }

    pub fn view(&self) -> BgrImageView<'_> {
        BgrImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Bilinear sample of `b + g + r` at a sub-pixel location.
///
/// Returns `None` for non-finite coordinates or when any of the four
/// neighbours falls outside the frame.
#[inline]
pub fn sample_channel_sum(src: &BgrImageView<'_>, x: f32, y: f32) -> Option<f32> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.channel_sum_i(x0, y0)?;
    let p10 = src.channel_sum_i(x0 + 1, y0)?;
    let p01 = src.channel_sum_i(x0, y0 + 1)?;
    let p11 = src.channel_sum_i(x0 + 1, y0 + 1)?;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    Some(a + fy * (b - a))
}

/// Binary mask: one byte per pixel, `Mask::ON` (255) for detected, 0 otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Mask {
    pub const ON: u8 = 255;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] == Self::ON
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        self.data[y * self.width + x] = Self::ON;
    }

    /// Set every pixel of the inclusive rectangle `[x0, x1] x [y0, y1]`.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        for y in y0..=y1.min(self.height.saturating_sub(1)) {
            for x in x0..=x1.min(self.width.saturating_sub(1)) {
                self.set(x, y);
            }
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v == Self::ON).count()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
