use super::SampledPoint;
use crate::config::SamplingParams;
use crate::consts::{CodePoint, NOT_A_CODE_POINT, NOT_A_COORDINATE};
use crate::geometry::{angle, angle_diff, distance_int};
use crate::proximity::{ProximityCodes, ProximityInfo};
use crate::trace::InputTrace;
use std::collections::BTreeMap;
use std::mem;
use tracing::trace;

/// Normalized squared distance of every key close to one raw point.
type NearKeys = BTreeMap<usize, f32>;

/// Near-key maps of the current raw point and the two before it.
#[derive(Debug, Default)]
struct NearKeyRing {
    current: NearKeys,
    prev: NearKeys,
    prev_prev: NearKeys,
}

impl NearKeyRing {
    /// The previous sample was replaced by the current one.
    fn rotate_popped(&mut self) {
        mem::swap(&mut self.prev, &mut self.current);
    }

    fn rotate_kept(&mut self) {
        mem::swap(&mut self.prev_prev, &mut self.prev);
        mem::swap(&mut self.prev, &mut self.current);
    }

    /// Whether the previous point was closer to one of its near keys than both neighbors.
    fn is_prev_local_min(&self, margin: f32) -> bool {
        self.prev.iter().any(|(key, &d)| {
            let farther = |map: &NearKeys| map.get(key).map_or(true, |&other| other > d + margin);
            farther(&self.prev_prev) && farther(&self.current)
        })
    }
}

pub(super) struct Sampler<'a> {
    pub info: &'a ProximityInfo,
    pub params: &'a SamplingParams,
    pub geometric: bool,
}

impl Sampler<'_> {
    /// Samples raw points of `pointer_id` from `start_index` on, appending to `points`.
    /// Gesture input is down-sampled; taps are all kept.
    pub fn update_touch_points(
        &self,
        trace: &InputTrace,
        proximities: &[ProximityCodes],
        pointer_id: i32,
        start_index: usize,
        points: &mut Vec<SampledPoint>,
    ) -> usize {
        if start_index >= trace.len() {
            return points.len();
        }
        let (xs, ys) = (&trace.xs, &trace.ys);
        let proximity_only = !self.geometric
            && matches!((xs.first(), ys.first()), (Some(&x), Some(&y)) if x < 0 || y < 0);

        let last_input_index = (start_index..trace.len())
            .rev()
            .find(|&i| trace.pointer_id_at(i) == pointer_id)
            .unwrap_or(start_index);

        let mut ring = NearKeyRing::default();
        let mut sum_angle = 0.0f32;

        for i in start_index..=last_input_index {
            if trace.pointer_id_at(i) != pointer_id {
                continue;
            }
            let code = if self.geometric {
                NOT_A_CODE_POINT
            } else {
                proximities.get(i).map_or(NOT_A_CODE_POINT, |p| p.primary())
            };
            let (x, y) = if proximity_only {
                (NOT_A_COORDINATE, NOT_A_COORDINATE)
            } else {
                (xs[i], ys[i])
            };

            if i > 1 {
                let prev_angle = angle(xs[i - 2], ys[i - 2], xs[i - 1], ys[i - 1]);
                let current_angle = angle(xs[i - 1], ys[i - 1], x, y);
                sum_angle += angle_diff(prev_angle, current_angle);
            }

            let popped = self.push_touch_point(
                &mut ring,
                i,
                code,
                (x, y, trace.time_at(i)),
                i == last_input_index,
                sum_angle,
                points,
            );
            if popped {
                ring.rotate_popped();
            } else {
                ring.rotate_kept();
                sum_angle = 0.0;
            }
        }
        points.len()
    }

    /// Returns true when the previously kept point was dropped in favor of this one.
    #[allow(clippy::too_many_arguments)]
    fn push_touch_point(
        &self,
        ring: &mut NearKeyRing,
        input_index: usize,
        code: CodePoint,
        (mut x, mut y, time): (i32, i32, i32),
        is_last_point: bool,
        sum_angle: f32,
        points: &mut Vec<SampledPoint>,
    ) -> bool {
        let mut popped = false;
        if code < 0 && self.geometric {
            let nearest = self.update_near_keys(x, y, &mut ring.current);
            let score = self.point_score(x, y, nearest, sum_angle, ring, points);
            if score < 0.0 {
                points.pop();
                popped = true;
            }
            if is_last_point {
                if let Some(last) = points.last() {
                    let gap = distance_int(x, y, last.x, last.y) as f32;
                    if gap * self.params.last_point_skip_distance_scale
                        < self.info.most_common_key_width() as f32
                    {
                        trace!(x, y, "last point too close to previous sample, skipped");
                        return popped;
                    }
                }
            }
        }

        if code >= 0 && (x < 0 || y < 0) {
            if let Some(key) = self.info.key_index_of(code) {
                x = self.info.key_center_x(key, NOT_A_COORDINATE, self.geometric);
                y = self.info.key_center_y(key, NOT_A_COORDINATE, self.geometric);
            }
        }

        let length = points
            .last()
            .map_or(0, |p| p.length + distance_int(x, y, p.x, p.y));
        points.push(SampledPoint {
            x,
            y,
            time,
            length,
            input_index,
        });
        popped
    }

    /// Fills `near` with keys under the distance threshold and returns the nearest distance,
    /// capped at the maximum point-to-key length.
    fn update_near_keys(&self, x: i32, y: i32, near: &mut NearKeys) -> f32 {
        near.clear();
        let mut nearest = self.params.max_point_to_key_length;
        for k in 0..self.info.key_count() {
            let d = self
                .info
                .normalized_squared_distance_from_center(k, x, y, self.geometric);
            if d < self.params.near_key_threshold_for_distance {
                near.insert(k, d);
            }
            nearest = nearest.min(d);
        }
        nearest
    }

    /// Usefulness of the previously kept point given the new raw point. Negative means the
    /// previous point adds nothing and can be replaced.
    fn point_score(
        &self,
        x: i32,
        y: i32,
        nearest: f32,
        sum_angle: f32,
        ring: &NearKeyRing,
        points: &[SampledPoint],
    ) -> f32 {
        let size = points.len();
        if size <= 1 || ring.prev.is_empty() {
            return 0.0;
        }
        let p = self.params;
        let last = points[size - 1];
        let before = points[size - 2];
        let dist_prev =
            distance_int(last.x, last.y, before.x, before.y) as f32 * p.distance_base_scale;

        let mut score = 0.0;
        if !ring.is_prev_local_min(p.margin_for_prev_local_min) {
            score += p.not_localmin_distance_score;
        } else if nearest < p.near_key_threshold_for_point_score {
            score += p.localmin_distance_and_near_to_key_score;
        }

        let angle1 = angle(x, y, last.x, last.y);
        let angle2 = angle(last.x, last.y, before.x, before.y);
        let turn = angle_diff(angle1, angle2);
        let base_sample_rate = self.info.most_common_key_width() as f32;
        if dist_prev > base_sample_rate * p.corner_check_distance_threshold_scale
            && (sum_angle > p.corner_sum_angle_threshold
                || turn > p.corner_angle_threshold_for_point_score)
        {
            score += p.corner_score;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_rotation_recycles_buffers() {
        let mut ring = NearKeyRing::default();
        ring.current.insert(1, 0.5);
        ring.rotate_kept();
        assert!(ring.current.is_empty());
        assert_eq!(ring.prev.get(&1), Some(&0.5));

        ring.current.insert(2, 0.1);
        ring.rotate_popped();
        assert_eq!(ring.prev.get(&2), Some(&0.1));
        assert_eq!(ring.current.get(&1), Some(&0.5));
    }

    #[test]
    fn local_min_needs_both_neighbors_farther() {
        let mut ring = NearKeyRing::default();
        ring.prev.insert(0, 0.2);
        ring.prev_prev.insert(0, 0.9);
        ring.current.insert(0, 0.8);
        assert!(ring.is_prev_local_min(0.01));
        ring.current.insert(0, 0.205);
        assert!(!ring.is_prev_local_min(0.01));
        ring.current.remove(&0);
        assert!(ring.is_prev_local_min(0.01));
    }
}
