use super::{direction_between, point_angle, points_angle, KeyDistribution, SampledPoint};
use crate::config::ProbabilityParams;
use crate::consts::{
    CodePoint, MAX_VALUE_FOR_WEIGHTING_F32, MAX_WORD_LENGTH, NOT_A_CODE_POINT, NOT_A_COORDINATE,
};
use crate::distribution::NormalDistribution2D;
use crate::proximity::ProximityInfo;
use std::f32::consts::PI;
use tracing::{trace, warn};

pub(super) struct ProbabilityAssigner<'a> {
    pub info: &'a ProximityInfo,
    pub params: &'a ProbabilityParams,
    pub max_point_to_key_length: f32,
}

impl ProbabilityAssigner<'_> {
    /// Assigns skip and key probabilities to sampled points from `start` on, suppresses keys
    /// shared by nearby points and converts every retained mass to a negative-log cost.
    pub fn update_align_point_probabilities(
        &self,
        start: usize,
        points: &[SampledPoint],
        speed_rates: &[f32],
        normalized_squared_lengths: &[f32],
        distributions: &mut Vec<KeyDistribution>,
    ) {
        let size = points.len();
        let key_count = self.info.key_count();
        distributions.truncate(start);
        distributions.resize_with(size, KeyDistribution::default);

        for i in start..size {
            let nearest = (0..key_count)
                .map(|k| {
                    normalized_squared_lengths[i * key_count + k].min(self.max_point_to_key_length)
                })
                .fold(MAX_VALUE_FOR_WEIGHTING_F32, f32::min);
            distributions[i] = self.point_distribution(i, points, speed_rates, nearest);
        }

        for i in start.max(1)..size {
            for j in i + 1..size {
                if !self.suppress(points, i, j, distributions) {
                    break;
                }
            }
            for j in (start..i).rev() {
                if !self.suppress(points, i, j, distributions) {
                    break;
                }
            }
        }

        for d in &mut distributions[start..] {
            d.keys.retain(|_, p| *p >= self.params.min_probability);
            for p in d.keys.values_mut() {
                *p = -p.ln();
            }
            d.skip = -d.skip.ln();
        }
    }

    fn skip_probability(
        &self,
        i: usize,
        points: &[SampledPoint],
        speed_rates: &[f32],
        nearest: f32,
        current_angle: f32,
    ) -> f32 {
        let p = self.params;
        let size = points.len();
        let speed = speed_rates[i];
        let mut skip = p.max_skip_probability;

        if i == 0 {
            skip *= (nearest * p.nearest_distance_weight + p.nearest_distance_bias).min(1.0);
            skip *= p.skip_first_point_probability;
        } else if i == size - 1 {
            skip *= (nearest * p.nearest_distance_weight_for_last
                + p.nearest_distance_bias_for_last)
                .min(1.0);
            skip *= p.skip_last_point_probability;
        } else {
            // Slower than both neighbors: likely a deliberate key hit.
            if speed_rates[i - 1] - p.speed_margin > speed
                && speed < speed_rates[i + 1] - p.speed_margin
            {
                if current_angle < p.corner_angle_threshold {
                    skip *= (speed * p.slow_straight_weight_for_skip_probability).min(1.0);
                } else {
                    skip *= (speed * p.speed_weight_for_skip_probability
                        + p.min_speed_rate_for_skip_probability)
                        .min(1.0);
                }
            }

            skip *=
                (speed * nearest * p.nearest_distance_weight + p.nearest_distance_bias).min(1.0);
            skip *= (PI - current_angle) / PI * p.angle_weight + (1.0 - p.angle_weight);
            if current_angle > p.deep_corner_angle_threshold {
                skip *= p.skip_deep_corner_probability;
            }
            // Straight run into a sharp turn. Looking back past the previous point is less
            // sensitive to noise.
            if i >= 3
                && points_angle(points, i, i - 2, i - 3) < p.straight_angle_threshold
                && current_angle > p.corner_angle_threshold
            {
                skip *= p.skip_corner_probability;
            }
        }
        skip
    }

    fn point_distribution(
        &self,
        i: usize,
        points: &[SampledPoint],
        speed_rates: &[f32],
        nearest: f32,
    ) -> KeyDistribution {
        let p = self.params;
        let size = points.len();
        let current_angle = point_angle(points, i);
        let speed = speed_rates[i];
        let skip = self.skip_probability(i, points, speed_rates, nearest, current_angle);

        let speed_x_angle = (speed * current_angle / PI
            * p.speedxangle_weight_for_standard_deviation)
            .min(p.max_speedxangle_rate_for_standard_deviation);
        let speed_x_nearest = (speed * nearest * p.speedxnearest_weight_for_standard_deviation)
            .min(p.max_speedxnearest_rate_for_standard_deviation);
        let sigma = (speed_x_angle + speed_x_nearest + p.min_standard_deviation)
            * self.info.most_common_key_width() as f32;

        let (theta, sigma_x, sigma_y) = if i == 0 && size > 1 {
            (
                direction_between(points, i + 1, i),
                sigma * p.standard_deviation_x_weight_for_first,
                sigma * p.standard_deviation_y_weight_for_first,
            )
        } else if i == size - 1 {
            (
                i.checked_sub(1)
                    .map_or(0.0, |prev| direction_between(points, i, prev)),
                sigma * p.standard_deviation_x_weight_for_last,
                sigma * p.standard_deviation_y_weight_for_last,
            )
        } else {
            (
                direction_between(points, i, i - 1),
                sigma * p.standard_deviation_x_weight,
                sigma * p.standard_deviation_y_weight,
            )
        };

        let point = points[i];
        let gaussian =
            NormalDistribution2D::new(point.x as f32, sigma_x, point.y as f32, sigma_y, theta);
        let densities: Vec<f32> = (0..self.info.key_count())
            .map(|k| {
                let cx = self.info.key_center_x(k, NOT_A_COORDINATE, true);
                let cy = self.info.key_center_y(k, NOT_A_COORDINATE, true);
                gaussian.density(cx as f32, cy as f32)
            })
            .collect();
        let total: f32 = densities.iter().sum();

        if total <= 0.0 || !total.is_finite() {
            warn!(
                index = i,
                x = point.x,
                y = point.y,
                "no key density around sampled point, treating it as skipped"
            );
            return KeyDistribution {
                skip: 1.0,
                keys: (0..densities.len()).map(|k| (k, 0.0)).collect(),
            };
        }

        let key_mass = 1.0 - skip;
        trace!(index = i, skip, sigma, theta, "point distribution");
        KeyDistribution {
            skip,
            keys: densities
                .into_iter()
                .enumerate()
                .map(|(k, density)| (k, key_mass * density / total))
                .collect(),
        }
    }

    /// Moves mass of keys that `index1` claims more strongly away from `index0`. Returns false
    /// once the two points are too far apart along the path.
    fn suppress(
        &self,
        points: &[SampledPoint],
        index0: usize,
        index1: usize,
        distributions: &mut [KeyDistribution],
    ) -> bool {
        let p = self.params;
        let key_width = self.info.most_common_key_width() as f32;
        let diff = (points[index0].length - points[index1].length).abs() as f32;
        if diff > key_width * p.suppression_length_weight {
            return false;
        }
        let rate = p.min_suppression_rate
            + diff / key_width / p.suppression_length_weight * p.suppression_weight;

        let (d0, d1) = pair_mut(distributions, index0, index1);
        for (key, p0) in d0.keys.iter_mut() {
            let Some(p1) = d1.keys.get_mut(key) else {
                continue;
            };
            if *p0 < *p1 {
                let reduced = *p0 * rate;
                let suppression = *p0 - reduced;
                *p0 = reduced;
                d0.skip += suppression;

                let gain = (suppression * p.suppression_weight_for_probability_gain)
                    .min(d1.skip * p.skip_probability_weight_for_probability_gain);
                *p1 += gain;
                d1.skip -= gain;
            }
        }
        true
    }
}

/// Two distinct elements of a slice, mutably.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Greedy decode: the cheapest bucket of every point, keys paying `demotion` on top of their
/// cost when compared. The returned cost sums the chosen buckets without the demotion.
pub(super) fn most_probable_string(
    info: &ProximityInfo,
    demotion: f32,
    distributions: &[KeyDistribution],
) -> (Vec<CodePoint>, f32) {
    let mut word = Vec::new();
    let mut total = 0.0;
    for d in distributions {
        if word.len() >= MAX_WORD_LENGTH - 1 {
            break;
        }
        let mut best: Option<usize> = None;
        let mut best_score = MAX_VALUE_FOR_WEIGHTING_F32;
        let mut best_cost = MAX_VALUE_FOR_WEIGHTING_F32;
        if d.skip < best_score {
            best_score = d.skip;
            best_cost = d.skip;
        }
        for (&key, &cost) in &d.keys {
            if cost + demotion < best_score {
                best_score = cost + demotion;
                best_cost = cost;
                best = Some(key);
            }
        }
        if let Some(key) = best {
            let code = info.code_point_of(key);
            if code == NOT_A_CODE_POINT {
                warn!(key, "key has no code point, dropping most probable string");
                word.clear();
                break;
            }
            word.push(code);
        }
        total += best_cost;
    }
    (word, total)
}
