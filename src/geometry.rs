//! Plane geometry on integer touch coordinates.

use std::f32::consts::PI;

const TWO_PI: f32 = PI * 2.0;

#[inline(always)]
pub fn square(x: f32) -> f32 {
    x * x
}

/// Direction of the vector pointing from `(x2, y2)` to `(x1, y1)`, in `(-π, π]`.
/// Coincident points have no direction and yield 0.
#[inline(always)]
pub fn angle(x1: i32, y1: i32, x2: i32, y2: i32) -> f32 {
    let dx = (i64::from(x1) - i64::from(x2)) as f32;
    let dy = (i64::from(y1) - i64::from(y2)) as f32;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    dy.atan2(dx)
}

/// Absolute difference between two angles, folded into `[0, π]`.
#[inline(always)]
pub fn angle_diff(a1: f32, a2: f32) -> f32 {
    let mut delta = (a1 - a2).abs();
    if !delta.is_finite() {
        return 0.0;
    }
    if delta > TWO_PI {
        delta %= TWO_PI;
    }
    if delta > PI {
        delta = TWO_PI - delta;
    }
    delta.clamp(0.0, PI)
}

/// Euclidean distance truncated toward zero, saturating at `i32::MAX`.
#[inline(always)]
pub fn distance_int(x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    let dx = (i64::from(x1) - i64::from(x2)) as f32;
    let dy = (i64::from(y1) - i64::from(y2)) as f32;
    dx.hypot(dy) as i32
}

#[inline(always)]
pub fn squared_distance_f32(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    square(x1 - x2) + square(y1 - y2)
}

/// Squared distance from `(x, y)` to the segment `(x1, y1)-(x2, y2)`.
pub fn point_to_segment_squared_distance(
    x: f32,
    y: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    extend: bool,
) -> f32 {
    let ray_x = x2 - x1;
    let ray_y = y2 - y1;
    let len_sq = square(ray_x) + square(ray_y);
    if len_sq == 0.0 {
        return squared_distance_f32(x, y, x1, y1);
    }
    let dot = (x - x1) * ray_x + (y - y1) * ray_y;
    let t = dot / len_sq;
    let (px, py) = if !extend && t <= 0.0 {
        (x1, y1)
    } else if !extend && t >= 1.0 {
        (x2, y2)
    } else {
        (x1 + t * ray_x, y1 + t * ray_y)
    };
    squared_distance_f32(x, y, px, py)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_diff_wraps_across_pi() {
        let d = angle_diff(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-5);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let d = point_to_segment_squared_distance(-3.0, 4.0, 0.0, 0.0, 10.0, 0.0, false);
        assert!((d - 25.0).abs() < 1e-4);
        let d = point_to_segment_squared_distance(-3.0, 4.0, 0.0, 0.0, 10.0, 0.0, true);
        assert!((d - 16.0).abs() < 1e-4);
    }
}
