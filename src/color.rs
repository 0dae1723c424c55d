//! RGBA colour values used for every renderable property.

use std::ops::{Add, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub(crate) const MIN_CHANNEL: f32 = 0.0;
pub(crate) const MAX_CHANNEL: f32 = 1.0;

/// A colour with four channels, nominally in [0, 1].
///
/// Arithmetic is component-wise and does not clamp; call [`Rgba::clamped`]
/// before handing a colour to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Fully dark and fully transparent. Targets start here and release to here.
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Apply `f` to each channel.
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b), f(self.a))
    }

    /// Combine two colours channel by channel.
    pub fn zip_with(self, other: Rgba, mut f: impl FnMut(f32, f32) -> f32) -> Self {
        Self::new(
            f(self.r, other.r),
            f(self.g, other.g),
            f(self.b, other.b),
            f(self.a, other.a),
        )
    }

    pub fn clamped(self) -> Self {
        self.map(|c| c.clamp(MIN_CHANNEL, MAX_CHANNEL))
    }

    /// Round every channel to `decimals` places.
    pub fn rounded(self, decimals: i32) -> Self {
        self.map(|c| crate::math::round_to(c, decimals))
    }

    /// Component-wise [`crate::math::approx_eq`].
    pub fn approx_eq(&self, other: &Rgba, precision: i32) -> bool {
        use crate::math::approx_eq;
        approx_eq(self.r, other.r, precision)
            && approx_eq(self.g, other.g, precision)
            && approx_eq(self.b, other.b, precision)
            && approx_eq(self.a, other.a, precision)
    }

    /// Rotate the hue of the RGB part by `turns` (1.0 = full circle).
    /// Alpha is untouched.
    pub fn hue_rotated(self, turns: f32) -> Self {
        if turns == 0.0 {
            return self;
        }
        let (h, s, v) = rgb_to_hsv(self.r, self.g, self.b);
        let (r, g, b) = hsv_to_rgb((h + turns).rem_euclid(1.0), s, v);
        Self::new(r, g, b, self.a)
    }

    /// 8-bit channels, alpha dropped. Used by terminal renderers.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let c = self.clamped();
        let q = |v: f32| (v * 255.0).round() as u8;
        (q(c.r), q(c.g), q(c.b))
    }
}

impl Add for Rgba {
    type Output = Rgba;

    fn add(self, rhs: Rgba) -> Rgba {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for Rgba {
    type Output = Rgba;

    fn sub(self, rhs: Rgba) -> Rgba {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul<f32> for Rgba {
    type Output = Rgba;

    fn mul(self, rhs: f32) -> Rgba {
        self.map(|c| c * rhs)
    }
}

// hue in turns [0, 1)
fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta <= f32::EPSILON {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };

    (h, s, max)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let sector = h * 6.0;
    let c = v * s;
    let x = c * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (r + m, g + m, b + m)
}
