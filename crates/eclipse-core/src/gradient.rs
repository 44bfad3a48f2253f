//! Piecewise-linear color ramps.

use eclipse_platform::Rgba;
use serde::{Deserialize, Serialize};

/// Returned by an empty gradient.
pub const FALLBACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

#[inline]
pub fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    a + (b - a) * t
}

/// Sample uniformly spaced `stops` at `t`, clamping `t` into `[0, 1]`.
pub fn sample(stops: &[Rgba], t: f32) -> Rgba {
    match stops {
        [] => FALLBACK,
        [only] => *only,
        _ => {
            let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
            let segment = 1.0 / (stops.len() - 1) as f32;
            // t == 1 lands one past the last segment
            let index = ((t / segment) as usize).min(stops.len() - 2);
            let local = (t - index as f32 * segment) / segment;
            lerp_rgba(stops[index], stops[index + 1], local)
        }
    }
}

/// Ordered color stops over `[0, 1]`. Serialized as a plain list of `[r, g, b, a]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gradient {
    stops: Vec<Rgba>,
}

impl Gradient {
    pub fn new(stops: Vec<Rgba>) -> Self {
        Self { stops }
    }

    pub fn stops(&self) -> &[Rgba] {
        &self.stops
    }

    pub fn sample(&self, t: f32) -> Rgba {
        sample(&self.stops, t)
    }
}
