//! Frame-rate independent smoothing helpers.
//!
//! `smooth_damp` is a critically damped spring toward a moving target. The
//! caller owns the velocity state and passes it back in every frame, so the
//! function itself is pure given its inputs. The exponential decay is
//! approximated by the rational polynomial `1 / (1 + x + 0.48x² + 0.235x³)`,
//! which stays stable for large `x` (long frames) where a Taylor expansion
//! would not.

use glam::Vec2;

/// Smallest smooth time accepted; anything lower is clamped up to it.
pub const MIN_SMOOTH_TIME: f32 = 0.0001;

/// Move `current` toward `target` with critically damped smoothing.
///
/// `velocity` is read and updated in place. `max_speed` caps how fast the
/// value may close the gap; pass `f32::MAX` (or NaN) for no cap. Negative
/// caps are treated as their magnitude.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    max_speed: f32,
    delta_time: f32,
) -> f32 {
    if delta_time <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;

    let x = omega * delta_time;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let requested_target = target;
    // A NaN cap means no cap; a negative one is taken by magnitude.
    let max_speed = if max_speed.is_nan() {
        f32::MAX
    } else {
        max_speed.abs()
    };
    let max_change = max_speed * smooth_time;
    let change = (current - target).clamp(-max_change, max_change);
    let target = current - change;

    let temp = (*velocity + omega * change) * delta_time;
    *velocity = (*velocity - omega * temp) * exp;
    let mut result = target + (change + temp) * exp;

    // Overshoot guard: a long frame must never carry the value past the target.
    if (requested_target - current > 0.0) == (result > requested_target) {
        result = requested_target;
        *velocity = (result - requested_target) / delta_time;
    }

    result
}

/// Component-wise [`smooth_damp`] for 2D vectors.
pub fn smooth_damp_vec2(
    current: Vec2,
    target: Vec2,
    velocity: &mut Vec2,
    smooth_time: f32,
    max_speed: f32,
    delta_time: f32,
) -> Vec2 {
    let x = smooth_damp(
        current.x,
        target.x,
        &mut velocity.x,
        smooth_time,
        max_speed,
        delta_time,
    );
    let y = smooth_damp(
        current.y,
        target.y,
        &mut velocity.y,
        smooth_time,
        max_speed,
        delta_time,
    );
    Vec2::new(x, y)
}

/// Quadratic ease-out over normalized time; `t` is clamped to `[0, 1]`.
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn at_target_stays_at_target() {
        for &smooth_time in &[0.01, 0.12, 0.5, 2.0] {
            for &dt in &[0.001, DT, 0.1, 1.0] {
                let mut velocity = 0.0;
                let out = smooth_damp(5.0, 5.0, &mut velocity, smooth_time, f32::MAX, dt);
                assert_eq!(out, 5.0);
                assert_eq!(velocity, 0.0);
            }
        }
    }

    #[test]
    fn converges_toward_target_without_overshoot() {
        let mut value = 0.0;
        let mut velocity = 0.0;
        for _ in 0..600 {
            value = smooth_damp(value, 100.0, &mut velocity, 0.12, f32::MAX, DT);
            assert!(value <= 100.0, "overshot target: {value}");
        }
        assert!((value - 100.0).abs() < 0.01);
    }

    #[test]
    fn approaching_from_above_never_undershoots() {
        let mut value = 50.0;
        let mut velocity = 0.0;
        for _ in 0..300 {
            value = smooth_damp(value, -20.0, &mut velocity, 0.2, f32::MAX, DT);
            assert!(value >= -20.0);
        }
    }

    #[test]
    fn overshoot_snaps_to_target_and_zeroes_velocity() {
        // Carrying a large velocity into a long frame would pass the target.
        let mut velocity = 1000.0;
        let out = smooth_damp(0.0, 10.0, &mut velocity, 0.1, f32::MAX, 0.1);
        assert_eq!(out, 10.0);
        assert_eq!(velocity, 0.0);
    }

    #[test]
    fn long_frame_lands_short_of_target() {
        let mut velocity = 0.0;
        let out = smooth_damp(0.0, 10.0, &mut velocity, 0.05, f32::MAX, 5.0);
        assert!(out <= 10.0);
        assert!((out - 10.0).abs() < 0.01);
    }

    #[test]
    fn max_speed_caps_closing_distance() {
        let mut capped_velocity = 0.0;
        let mut free_velocity = 0.0;
        let capped = smooth_damp(0.0, 1000.0, &mut capped_velocity, 0.3, 10.0, DT);
        let free = smooth_damp(0.0, 1000.0, &mut free_velocity, 0.3, f32::MAX, DT);
        assert!(capped > 0.0);
        assert!(capped < free);
    }

    #[test]
    fn negative_max_speed_uses_its_magnitude() {
        let mut negative_velocity = 0.0;
        let mut positive_velocity = 0.0;
        let negative = smooth_damp(0.0, 10.0, &mut negative_velocity, 0.1, -1.0, DT);
        let positive = smooth_damp(0.0, 10.0, &mut positive_velocity, 0.1, 1.0, DT);
        assert_eq!(negative, positive);
        assert_eq!(negative_velocity, positive_velocity);
        assert!(negative > 0.0);
    }

    #[test]
    fn nan_max_speed_means_uncapped() {
        let mut nan_velocity = 0.0;
        let mut free_velocity = 0.0;
        let nan = smooth_damp(0.0, 10.0, &mut nan_velocity, 0.1, f32::NAN, DT);
        let free = smooth_damp(0.0, 10.0, &mut free_velocity, 0.1, f32::MAX, DT);
        assert_eq!(nan, free);
        assert_eq!(nan_velocity, free_velocity);
        assert!(nan.is_finite());
    }

    #[test]
    fn zero_smooth_time_is_clamped_not_nan() {
        let mut velocity = 0.0;
        let out = smooth_damp(0.0, 1.0, &mut velocity, 0.0, f32::MAX, DT);
        assert!(out.is_finite());
        assert!(velocity.is_finite());
    }

    #[test]
    fn zero_delta_time_is_a_no_op() {
        let mut velocity = 3.0;
        let out = smooth_damp(1.0, 1.0, &mut velocity, 0.1, f32::MAX, 0.0);
        assert_eq!(out, 1.0);
        assert_eq!(velocity, 3.0);
    }

    #[test]
    fn vec2_matches_scalar_per_component() {
        let mut v2 = Vec2::ZERO;
        let mut vx = 0.0;
        let mut vy = 0.0;
        let out = smooth_damp_vec2(
            Vec2::new(1.0, -4.0),
            Vec2::new(9.0, 3.0),
            &mut v2,
            0.15,
            f32::MAX,
            DT,
        );
        let x = smooth_damp(1.0, 9.0, &mut vx, 0.15, f32::MAX, DT);
        let y = smooth_damp(-4.0, 3.0, &mut vy, 0.15, f32::MAX, DT);
        assert_eq!(out, Vec2::new(x, y));
        assert_eq!(v2, Vec2::new(vx, vy));
    }

    #[test]
    fn ease_out_quad_endpoints_and_clamp() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(-3.0), 0.0);
        assert_eq!(ease_out_quad(7.0), 1.0);
        assert!((ease_out_quad(0.5) - 0.75).abs() < 1e-6);
    }
}
