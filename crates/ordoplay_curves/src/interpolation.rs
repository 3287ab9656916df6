// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar interpolation and wrapping helpers shared by curves, ramps and graph nodes.

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Hermite spline interpolation
    pub fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
    }

    /// Interpolate RGBA
    pub fn lerp_rgba(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
            Self::lerp(a[3], b[3], t),
        ]
    }

    /// Spherical interpolation between unit quaternions stored as `[x, y, z, w]`
    ///
    /// `t` is not clamped, so values outside `[0, 1]` extrapolate along the arc.
    pub fn slerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        let mut dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3];

        // Take the short way round
        let mut b = b;
        if dot < 0.0 {
            b = [-b[0], -b[1], -b[2], -b[3]];
            dot = -dot;
        }

        if dot > 0.9995 {
            let result = Self::lerp_rgba(a, b, t);
            let len = result.iter().map(|c| c * c).sum::<f32>().sqrt();
            if len <= f32::EPSILON {
                return a;
            }
            return result.map(|c| c / len);
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta_0 = theta_0.sin();
        let s0 = (theta_0 - theta).sin() / sin_theta_0;
        let s1 = theta.sin() / sin_theta_0;

        [
            a[0] * s0 + b[0] * s1,
            a[1] * s0 + b[1] * s1,
            a[2] * s0 + b[2] * s1,
            a[3] * s0 + b[3] * s1,
        ]
    }

    /// Smoothstep-style easing `t²(3 − 2t)`
    pub fn smooth(t: f32) -> f32 {
        t * t * (3.0 - 2.0 * t)
    }

    /// Wrap `t` into `[0, length)`
    pub fn repeat(t: f32, length: f32) -> f32 {
        (t - (t / length).floor() * length).clamp(0.0, length)
    }

    /// Bounce `t` back and forth between 0 and `length`
    pub fn ping_pong(t: f32, length: f32) -> f32 {
        let t = Self::repeat(t, length * 2.0);
        length - (t - length).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hermite_endpoints() {
        assert_eq!(Interpolation::hermite(1.0, 5.0, 3.0, -2.0, 0.0), 1.0);
        assert_eq!(Interpolation::hermite(1.0, 5.0, 3.0, -2.0, 1.0), 3.0);
    }

    #[test]
    fn test_repeat_and_ping_pong() {
        assert!((Interpolation::repeat(2.5, 1.0) - 0.5).abs() < 1e-6);
        assert!((Interpolation::repeat(-0.25, 1.0) - 0.75).abs() < 1e-6);
        assert!((Interpolation::ping_pong(1.5, 1.0) - 0.5).abs() < 1e-6);
        assert!((Interpolation::ping_pong(0.25, 1.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_slerp_halfway() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let b = [0.0, 1.0, 0.0, 0.0];
        let mid = Interpolation::slerp(a, b, 0.5);
        assert!((mid[1] - half).abs() < 1e-5);
        assert!((mid[3] - half).abs() < 1e-5);
        assert_eq!(Interpolation::slerp(a, a, 0.3), a);
    }

    #[test]
    fn test_smooth() {
        assert_eq!(Interpolation::smooth(0.0), 0.0);
        assert_eq!(Interpolation::smooth(0.5), 0.5);
        assert_eq!(Interpolation::smooth(1.0), 1.0);
    }
}
