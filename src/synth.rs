//! Ideal gestures: a trace through the centers of a word's keys, for simulation and
//! benchmarking.

use crate::consts::{CodePoint, NOT_A_COORDINATE};
use crate::error::{DecoderError, DgResult};
use crate::geometry::{point_to_segment_squared_distance, squared_distance_f32};
use crate::proximity::ProximityInfo;
use crate::trace::InputTrace;
use tracing::debug;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct SynthOptions {
    /// Largest distance between two consecutive generated points, in pixels.
    #[builder(default = 10)]
    pub step: i32,
    /// Finger speed in pixels per millisecond.
    #[builder(default = 1.0)]
    pub speed: f32,
    /// Uniform noise added to both coordinates, in pixels.
    #[builder(default = 0)]
    pub jitter: i32,
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Key centers the finger passes through. A doubled letter adds a small loop around its key.
fn waypoints(word: &str, info: &ProximityInfo) -> DgResult<Vec<(f32, f32)>> {
    let loop_dx = info.most_common_key_width() as f32 / 4.0;
    let loop_dy = info.most_common_key_height() as f32 / 4.0;
    let mut points: Vec<(f32, f32)> = Vec::new();
    let mut previous_key = None;

    for c in word.chars() {
        let key = info.key_index_of(c as CodePoint).ok_or_else(|| {
            DecoderError::Validation(format!("no key for '{}' in this layout", c))
        })?;
        let cx = info.key_center_x(key, NOT_A_COORDINATE, true) as f32;
        let cy = info.key_center_y(key, NOT_A_COORDINATE, true) as f32;
        if previous_key == Some(key) {
            points.extend([
                (cx + loop_dx, cy),
                (cx, cy + loop_dy),
                (cx - loop_dx, cy),
                (cx, cy - loop_dy),
            ]);
        }
        points.push((cx, cy));
        previous_key = Some(key);
    }
    Ok(points)
}

/// Builds a timed trace for `word`, interpolated every `step` pixels at constant speed.
pub fn ideal_gesture(word: &str, info: &ProximityInfo, options: &SynthOptions) -> DgResult<InputTrace> {
    if word.is_empty() {
        return Err(DecoderError::Validation("cannot synthesize an empty word".into()));
    }
    if options.step <= 0 || options.speed <= 0.0 {
        return Err(DecoderError::Config(format!(
            "step and speed must be positive, got {} and {}",
            options.step, options.speed
        )));
    }
    let waypoints = waypoints(word, info)?;

    let mut rng = match options.seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };
    let mut trace = InputTrace::new();
    let mut emit = |x: f32, y: f32, t: f32| {
        let (mut x, mut y) = (x.round() as i32, y.round() as i32);
        if options.jitter > 0 {
            x += rng.i32(-options.jitter..=options.jitter);
            y += rng.i32(-options.jitter..=options.jitter);
        }
        trace.push(x.max(0), y.max(0), t.round() as i32);
    };

    let (x0, y0) = waypoints[0];
    emit(x0, y0, 0.0);
    let mut time = 0.0f32;
    for pair in waypoints.windows(2) {
        let ((ax, ay), (bx, by)) = (pair[0], pair[1]);
        let length = (bx - ax).hypot(by - ay);
        let steps = ((length / options.step as f32).ceil() as usize).max(1);
        let dt = length / steps as f32 / options.speed;
        for s in 1..=steps {
            let f = s as f32 / steps as f32;
            time += dt;
            emit(ax + (bx - ax) * f, ay + (by - ay) * f, time);
        }
    }
    debug!(word, points = trace.len(), "synthesized gesture");
    Ok(trace)
}

/// Largest distance from any point of `trace` to the ideal path of `word`, in pixels.
/// Measures how far jitter pushed a synthesized gesture off the key centers.
pub fn path_drift(word: &str, info: &ProximityInfo, trace: &InputTrace) -> DgResult<f32> {
    let waypoints = waypoints(word, info)?;
    let Some(&(x0, y0)) = waypoints.first() else {
        return Err(DecoderError::Validation("cannot measure drift of an empty word".into()));
    };
    let worst = trace
        .xs
        .iter()
        .zip(&trace.ys)
        .map(|(&x, &y)| {
            let (x, y) = (x as f32, y as f32);
            waypoints
                .windows(2)
                .map(|pair| {
                    let ((ax, ay), (bx, by)) = (pair[0], pair[1]);
                    point_to_segment_squared_distance(x, y, ax, ay, bx, by, false)
                })
                .fold(squared_distance_f32(x, y, x0, y0), f32::min)
        })
        .fold(0.0f32, f32::max);
    Ok(worst.sqrt())
}
