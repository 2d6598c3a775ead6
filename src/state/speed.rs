use super::{direction_between, SampledPoint};
use crate::config::SamplingParams;
use crate::consts::MAX_PERCENTILE;
use crate::geometry::distance_int;
use crate::trace::InputTrace;

/// Recomputes speed rates and directions from `last_saved` on and returns the average speed
/// of the sampled path in pixels per millisecond. The average is 0 when no time has elapsed.
pub(super) fn refresh_speed_rates(
    params: &SamplingParams,
    trace: &InputTrace,
    last_saved: usize,
    points: &[SampledPoint],
    speed_rates: &mut Vec<f32>,
    directions: &mut Vec<f32>,
) -> f32 {
    let size = points.len();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        speed_rates.clear();
        directions.clear();
        return 0.0;
    };
    let sum_duration = last.time - first.time;
    let sum_length = last.length - first.length;
    let average_speed = if sum_duration == 0 {
        0.0
    } else {
        sum_length as f32 / sum_duration as f32
    };

    let raw_len = trace.len();
    let window = params.num_points_for_speed_calculation;
    let segment = |j: usize| {
        (
            distance_int(trace.xs[j], trace.ys[j], trace.xs[j + 1], trace.ys[j + 1]),
            trace.time_at(j + 1) - trace.time_at(j),
        )
    };

    speed_rates.truncate(last_saved);
    speed_rates.resize(size, 1.0);
    for i in last_saved..size {
        let index = points[i].input_index;
        let mut length = 0;
        let mut duration = 0;

        let forward_end = (raw_len - 1).min(index + window);
        for j in index..forward_end {
            if i + 1 < size && j >= points[i + 1].input_index {
                break;
            }
            let (l, d) = segment(j);
            length += l;
            duration += d;
        }
        let backward_end = index.saturating_sub(window);
        for j in (backward_end..index).rev() {
            if i > 0 && j < points[i - 1].input_index {
                break;
            }
            let (l, d) = segment(j);
            length += l;
            duration += d;
        }

        speed_rates[i] = if duration == 0 || sum_duration == 0 {
            1.0
        } else {
            (length as f32 / duration as f32) / average_speed
        };
    }

    let first_direction = last_saved.saturating_sub(1);
    directions.resize(first_direction, 0.0);
    directions.extend((first_direction..size - 1).map(|i| direction_between(points, i, i + 1)));
    average_speed
}

/// Beeline speed of every sampled point as an integer percentage of the average speed.
pub(super) fn beeline_speed_percentiles(
    params: &SamplingParams,
    most_common_key_width: i32,
    average_speed: f32,
    trace: &InputTrace,
    points: &[SampledPoint],
) -> Vec<i32> {
    (0..points.len())
        .map(|i| {
            let rate = beeline_speed_rate(
                params,
                most_common_key_width,
                average_speed,
                i,
                trace,
                points,
            );
            (rate * MAX_PERCENTILE as f32) as i32
        })
        .collect()
}

/// Straight-line speed across the raw points within a lookup radius around sampled point
/// `id`, relative to the average. Lingering on a key gives a low rate; 1.0 means unknown.
fn beeline_speed_rate(
    params: &SamplingParams,
    most_common_key_width: i32,
    average_speed: f32,
    id: usize,
    trace: &InputTrace,
    points: &[SampledPoint],
) -> f32 {
    if points.is_empty() || average_speed < 0.001 {
        return 1.0;
    }
    let raw_len = trace.len();
    let lookup_radius = most_common_key_width * params.lookup_radius_percentile / MAX_PERCENTILE;
    let SampledPoint {
        x: x0,
        y: y0,
        input_index: actual,
        ..
    } = points[id];
    let dist_to = |j: usize| distance_int(x0, y0, trace.xs[j], trace.ys[j]);

    let mut start = actual;
    let mut d = 0;
    while start > 0 && d < lookup_radius {
        start -= 1;
        d = dist_to(start);
    }
    // Exclusive unless this is an edge point.
    if start > 0 && start < actual {
        start += 1;
    }

    let mut end = actual;
    d = 0;
    while end + 1 < raw_len && d < lookup_radius {
        end += 1;
        d = dist_to(end);
    }
    if end > actual && end + 1 < raw_len {
        end -= 1;
    }

    if start >= end {
        return 1.0;
    }

    let beeline = distance_int(trace.xs[start], trace.ys[start], trace.xs[end], trace.ys[end]);
    let offset = params.first_point_time_offset_millis;
    let mut start_time = trace.time_at(start);
    if start == 0 && actual == 0 && raw_len > 1 {
        start_time += offset;
    }
    let mut end_time = trace.time_at(end);
    if end == raw_len - 1 && raw_len > 1 {
        end_time -= offset;
    }
    let time = end_time - start_time;
    if time <= 0 {
        return 1.0;
    }
    if time >= params.strong_double_letter_time_millis {
        return 0.0;
    }
    0.01 + beeline as f32 / time as f32 / average_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_trace() -> (InputTrace, Vec<SampledPoint>) {
        let raw: Vec<(i32, i32, i32)> = (0..5).map(|i| (i * 100, 0, i * 100)).collect();
        let trace = InputTrace::from_points(&raw);
        let points = raw
            .iter()
            .enumerate()
            .map(|(i, &(x, y, t))| SampledPoint {
                x,
                y,
                time: t,
                length: x,
                input_index: i,
            })
            .collect();
        (trace, points)
    }

    #[test]
    fn constant_speed_gives_unit_rates() {
        let (trace, points) = straight_trace();
        let mut rates = Vec::new();
        let mut directions = Vec::new();
        let average = refresh_speed_rates(
            &SamplingParams::default(),
            &trace,
            0,
            &points,
            &mut rates,
            &mut directions,
        );
        assert!((average - 1.0).abs() < 1e-6);
        assert_eq!(rates.len(), 5);
        assert!(rates.iter().all(|r| (r - 1.0).abs() < 1e-6));
        assert_eq!(directions.len(), 4);
    }

    #[test]
    fn zero_duration_keeps_neutral_rates() {
        let raw = [(0, 0, 50), (100, 0, 50)];
        let trace = InputTrace::from_points(&raw);
        let points = vec![
            SampledPoint {
                x: 0,
                y: 0,
                time: 50,
                length: 0,
                input_index: 0,
            },
            SampledPoint {
                x: 100,
                y: 0,
                time: 50,
                length: 100,
                input_index: 1,
            },
        ];
        let mut rates = Vec::new();
        let mut directions = Vec::new();
        let average = refresh_speed_rates(
            &SamplingParams::default(),
            &trace,
            0,
            &points,
            &mut rates,
            &mut directions,
        );
        assert_eq!(average, 0.0);
        assert_eq!(rates, vec![1.0, 1.0]);
        let percentiles =
            beeline_speed_percentiles(&SamplingParams::default(), 100, average, &trace, &points);
        assert_eq!(percentiles, vec![100, 100]);
    }
}
