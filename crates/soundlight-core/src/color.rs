//! RGB color type shared across the pipeline.

use serde::{Deserialize, Serialize};

/// 8-bit-per-channel RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Black (all channels 0), the color of a disabled or silent LED.
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// White (all channels 255).
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear interpolation between `from` and `to`.
    ///
    /// Each channel is computed as `from + (to - from) * t` in f64 and
    /// truncated toward zero, so for `t` in `[0, 1]` every channel lies
    /// between the corresponding endpoints.
    pub fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| -> u8 {
            (f64::from(a) + f64::from(i32::from(b) - i32::from(a)) * t) as u8
        };
        Rgb {
            r: channel(from.r, to.r),
            g: channel(from.g, to.g),
            b: channel(from.b, to.b),
        }
    }

    /// Pack as `0x00RRGGBB`, the order lighting drivers expect.
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }
}
