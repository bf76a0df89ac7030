//! Wraparound-safe angle arithmetic.
//!
//! All heading math in the engine goes through these helpers. Naive linear
//! interpolation of raw degree values breaks at the 0/360 boundary, so every
//! blend is expressed as "previous plus a fraction of the shortest signed
//! difference".

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = ((angle % 360.0) + 360.0) % 360.0;
    // f32 rounding can land exactly on 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed angular difference `to - from`, in (-180, 180].
pub fn shortest_difference(from: f32, to: f32) -> f32 {
    let mut diff = ((to - from + 540.0) % 360.0) - 180.0;
    // Rust's % keeps the sign of the dividend, which can alias results
    // just outside the target interval
    if diff <= -180.0 {
        diff += 360.0;
    } else if diff > 180.0 {
        diff -= 360.0;
    }
    diff
}

/// Exponential smoothing of `previous` toward `target` that takes the short
/// way around the circle. `alpha` of 1.0 lands exactly on `target`.
pub fn smooth(previous: f32, target: f32, alpha: f32) -> f32 {
    normalize_degrees(previous + alpha * shortest_difference(previous, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_range_and_idempotence() {
        for raw in [-1080.0_f32, -359.9, -180.0, -0.1, 0.0, 179.5, 360.0, 725.0, 7200.5] {
            let n = normalize_degrees(raw);
            assert!((0.0..360.0).contains(&n), "normalize({raw}) = {n} out of range");
            assert_relative_eq!(normalize_degrees(n), n, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_shortest_difference_range() {
        for a in (0..360).step_by(15) {
            for b in (0..360).step_by(15) {
                let d = shortest_difference(a as f32, b as f32);
                assert!(
                    d > -180.0 && d <= 180.0,
                    "shortest_difference({a}, {b}) = {d} out of range"
                );
            }
        }
    }

    #[test]
    fn test_shortest_difference_crosses_wraparound() {
        assert_relative_eq!(shortest_difference(350.0, 10.0), 20.0, epsilon = 1e-4);
        assert_relative_eq!(shortest_difference(10.0, 350.0), -20.0, epsilon = 1e-4);
        assert_relative_eq!(shortest_difference(0.0, 180.0), 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_smooth_identity_at_full_alpha() {
        for a in (0..360).step_by(45) {
            for b in (0..360).step_by(45) {
                let reconstructed = smooth(a as f32, b as f32, 1.0);
                assert_relative_eq!(
                    reconstructed,
                    normalize_degrees(b as f32),
                    epsilon = 1e-3
                );
            }
        }
    }

    #[test]
    fn test_smooth_takes_short_way_around() {
        // Halfway from 350 toward 10 is 0, not 180
        let mid = smooth(350.0, 10.0, 0.5);
        assert!(
            mid < 1.0 || mid > 359.0,
            "smooth(350, 10, 0.5) should land near 0, got {mid}"
        );
    }
}
