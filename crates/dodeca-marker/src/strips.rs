//! Row/column run detection on binary masks.
//!
//! A strip is a maximal band of consecutive rows (or columns) each holding at
//! least one set pixel. Two blobs sharing a band merge into one strip; the
//! cross product of row and column strips in `spots` separates them again.

use dodeca_core::Mask;
use serde::{Deserialize, Serialize};

/// Bands this narrow or narrower are treated as noise.
pub const MIN_STRIP_SPAN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanAxis {
    /// Bands of rows (`y` ranges).
    Rows,
    /// Bands of columns (`x` ranges).
    Columns,
}

/// Inclusive index band `[first, last]` along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strip {
    pub first: usize,
    pub last: usize,
}

impl Strip {
    /// Number of lines covered.
    #[inline]
    pub fn width(&self) -> usize {
        self.last - self.first + 1
    }

    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        (self.first..=self.last).contains(&i)
    }
}

/// True when line `i` along the primary axis holds a set pixel.
#[inline]
fn line_has_pixel(mask: &Mask, axis: ScanAxis, i: usize) -> bool {
    match axis {
        ScanAxis::Rows => {
            let row = &mask.data[i * mask.width..(i + 1) * mask.width];
            row.iter().any(|&v| v == Mask::ON)
        }
        ScanAxis::Columns => (0..mask.height).any(|y| mask.is_set(i, y)),
    }
}

/// Find the strips of `mask` along `axis`, in increasing order.
pub fn scan_strips(mask: &Mask, axis: ScanAxis) -> Vec<Strip> {
    let len = match axis {
        ScanAxis::Rows => mask.height,
        ScanAxis::Columns => mask.width,
    };
    if mask.is_empty() || mask.data.len() != mask.width * mask.height {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut i = 0;
    while i < len {
        if !line_has_pixel(mask, axis, i) {
            i += 1;
            continue;
        }
        let first = i;
        while i < len && line_has_pixel(mask, axis, i) {
            i += 1;
        }
        let last = i - 1;
        if last - first > MIN_STRIP_SPAN {
            out.push(Strip { first, last });
        }
    }
    out
}
