//! Interpolation helpers:
//! - lerp (scalar linear interpolation)
//! - cubic_bezier (Bernstein form, one axis)
//! - ease (fade ramps, linear or sine)

use std::f64::consts::PI;

use crate::config::FadeEasing;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic Bezier basis function evaluated on a single axis.
#[inline]
pub fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Map a fade progress `x` to a weight in `[0,1]`. Inputs outside `[0,1]` saturate.
#[inline]
pub fn ease(easing: FadeEasing, x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    match easing {
        FadeEasing::Linear => x,
        FadeEasing::Sine => 0.5 - 0.5 * (x * PI).cos(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bezier_endpoints_and_symmetry() {
        assert_eq!(cubic_bezier(0.0, 0.0, 10.0, 10.0, 0.0), 0.0);
        assert_eq!(cubic_bezier(0.0, 0.0, 10.0, 10.0, 1.0), 10.0);
        assert!((cubic_bezier(0.0, 0.0, 10.0, 10.0, 0.5) - 5.0).abs() < 1e-12);
        // Collinear control points reproduce linear interpolation.
        let v = cubic_bezier(0.0, 1.0, 2.0, 3.0, 0.25);
        assert!((v - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ease_saturates_and_is_monotonic() {
        for easing in [FadeEasing::Linear, FadeEasing::Sine] {
            assert_eq!(ease(easing, -1.0), 0.0);
            assert_eq!(ease(easing, 0.0), 0.0);
            assert_eq!(ease(easing, 1.0), 1.0);
            assert_eq!(ease(easing, 3.0), 1.0);
            assert_eq!(ease(easing, f64::NAN), 0.0);
            let mut last = 0.0;
            for i in 1..=100 {
                let w = ease(easing, i as f64 / 100.0);
                assert!(w >= last, "{easing:?} not monotonic at {i}");
                last = w;
            }
        }
        assert!((ease(FadeEasing::Sine, 0.5) - 0.5).abs() < 1e-12);
    }
}
