//! Per-pixel colour thresholding into binary spot masks.

use dodeca_core::{BgrImageView, Mask};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Printed spot colours, one mask each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotColor {
    Red,
    Green,
    Blue,
    Yellow,
}

impl SpotColor {
    pub const ALL: [SpotColor; 4] = [
        SpotColor::Red,
        SpotColor::Green,
        SpotColor::Blue,
        SpotColor::Yellow,
    ];

    /// Saturated printing colour in BGR order.
    pub fn bgr(self) -> [u8; 3] {
        match self {
            SpotColor::Red => [0, 0, 255],
            SpotColor::Green => [0, 255, 0],
            SpotColor::Blue => [255, 0, 0],
            SpotColor::Yellow => [0, 255, 255],
        }
    }
}

/// Tunable coefficients of one colour channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelParams {
    /// Gain on the channel itself, then on the two other channels in B, G, R
    /// order. Ignored for yellow, which uses a fixed formula.
    pub gains: [f32; 3],
    pub offset: i32,
    pub threshold: i32,
}

impl ChannelParams {
    pub const fn new(gains: [f32; 3], offset: i32, threshold: i32) -> Self {
        Self {
            gains,
            offset,
            threshold,
        }
    }
}

/// Coefficients for all four channels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorMaskParams {
    pub red: ChannelParams,
    pub green: ChannelParams,
    pub blue: ChannelParams,
    pub yellow: ChannelParams,
}

impl Default for ColorMaskParams {
    fn default() -> Self {
        let primary = ChannelParams::new([1.0, 1.0, 1.0], 0, 100);
        Self {
            red: primary,
            green: primary,
            blue: primary,
            yellow: ChannelParams::new([0.8, 1.0, 2.0], 0, 350),
        }
    }
}

impl ColorMaskParams {
    pub fn channel(&self, color: SpotColor) -> &ChannelParams {
        match color {
            SpotColor::Red => &self.red,
            SpotColor::Green => &self.green,
            SpotColor::Blue => &self.blue,
            SpotColor::Yellow => &self.yellow,
        }
    }
}

/// The four colour masks of one frame plus their union.
#[derive(Clone, Debug)]
pub struct SpotMasks {
    pub red: Mask,
    pub green: Mask,
    pub blue: Mask,
    pub yellow: Mask,
    /// Pixel-wise OR of the four colour masks.
    pub all: Mask,
}

impl SpotMasks {
    pub fn get(&self, color: SpotColor) -> &Mask {
        match color {
            SpotColor::Red => &self.red,
            SpotColor::Green => &self.green,
            SpotColor::Blue => &self.blue,
            SpotColor::Yellow => &self.yellow,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpotColor, &Mask)> {
        SpotColor::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Channel score of a bias-free pixel `[b, g, r]`.
#[inline]
fn channel_score(color: SpotColor, [b, g, r]: [f32; 3], p: &ChannelParams) -> f32 {
    let [own, o1, o2] = p.gains;
    let offset = p.offset as f32;
    match color {
        SpotColor::Red => r * own - b * o1 - g * o2 + offset,
        SpotColor::Green => g * own - b * o1 - r * o2 + offset,
        SpotColor::Blue => b * own - g * o1 - r * o2 + offset,
        SpotColor::Yellow => 0.8 * r + g - 2.0 * b + offset,
    }
}

/// Subtract the smallest channel from all three to drop the grey component.
#[inline]
fn remove_bias([b, g, r]: [u8; 3]) -> [f32; 3] {
    let m = b.min(g).min(r);
    [(b - m) as f32, (g - m) as f32, (r - m) as f32]
}

/// Threshold one colour channel of `frame` into a full-size mask.
pub fn compute_mask(frame: &BgrImageView<'_>, color: SpotColor, params: &ChannelParams) -> Mask {
    let mut mask = Mask::new(frame.width, frame.height);
    let threshold = params.threshold as f32;
    for y in 0..frame.height {
        for x in 0..frame.width {
            let px = remove_bias(frame.bgr(x, y));
            if channel_score(color, px, params) >= threshold {
                mask.set(x, y);
            }
        }
    }
    mask
}

/// Threshold all four channels in one pass and build the merged mask.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, params), fields(width = frame.width, height = frame.height))
)]
pub fn compute_masks(frame: &BgrImageView<'_>, params: &ColorMaskParams) -> SpotMasks {
    let (w, h) = (frame.width, frame.height);
    let mut masks = SpotMasks {
        red: Mask::new(w, h),
        green: Mask::new(w, h),
        blue: Mask::new(w, h),
        yellow: Mask::new(w, h),
        all: Mask::new(w, h),
    };

    for y in 0..h {
        for x in 0..w {
            let px = remove_bias(frame.bgr(x, y));
            let mut any = false;
            for color in SpotColor::ALL {
                let p = params.channel(color);
                if channel_score(color, px, p) >= p.threshold as f32 {
                    any = true;
                    match color {
                        SpotColor::Red => masks.red.set(x, y),
                        SpotColor::Green => masks.green.set(x, y),
                        SpotColor::Blue => masks.blue.set(x, y),
                        SpotColor::Yellow => masks.yellow.set(x, y),
                    }
                }
            }
            if any {
                masks.all.set(x, y);
            }
        }
    }
    masks
}
