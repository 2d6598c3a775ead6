//! Per-gesture state: the sampled, annotated view of a raw touch trace.
//!
//! A [`GestureState`] is refreshed with the whole trace on every call. When the new trace
//! extends the one seen last time, everything but the last two sampled points is kept and
//! only the tail is recomputed.

mod probability;
mod sampling;
mod search;
mod speed;

use crate::chars::{is_intentional_omission, to_base_code_point, to_base_lower_case, to_lower_case};
use crate::config::DecoderParams;
use crate::consts::{
    CodePoint, ADDITIONAL_PROXIMITY_CHAR_DELIMITER_CODE, MAX_KEY_COUNT, MAX_VALUE_FOR_WEIGHTING_F32,
    MAX_WORD_LENGTH, NOT_A_CODE_POINT,
};
use crate::error::{DecoderError, DgResult};
use crate::geometry::{angle, angle_diff};
use crate::proximity::{ProximityCodes, ProximityInfo, ProximityType};
use crate::trace::InputTrace;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use tracing::debug;
use typed_builder::TypedBuilder;

/// One point kept by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledPoint {
    pub x: i32,
    pub y: i32,
    pub time: i32,
    /// Cumulative path length from the first sampled point.
    pub length: i32,
    /// Index of this point in the raw trace.
    pub input_index: usize,
}

/// Probability mass per key plus the skip bucket for one sampled point.
///
/// While probabilities are being assigned the values are raw masses summing to one. Once the
/// state is refreshed they hold negative-log costs, with negligible keys dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyDistribution {
    pub skip: f32,
    pub keys: BTreeMap<usize, f32>,
}

impl KeyDistribution {
    pub fn cost_of(&self, key: usize) -> Option<f32> {
        self.keys.get(&key).copied()
    }

    /// Keys sorted by ascending cost.
    pub fn ranked(&self) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self.keys.iter().map(|(&k, &c)| (k, c)).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

/// Bitset over key indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeySet(u64);

impl KeySet {
    pub fn set(&mut self, key: usize) {
        if key < MAX_KEY_COUNT {
            self.0 |= 1 << key;
        }
    }

    pub fn test(&self, key: usize) -> bool {
        key < MAX_KEY_COUNT && self.0 & (1 << key) != 0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_KEY_COUNT).filter(move |&k| self.test(k))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum DoubleLetterLevel {
    NotADoubleLetter,
    ADoubleLetter,
    AStrongDoubleLetter,
}

/// How a trace should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct InputMode {
    /// Only raw points of this pointer are sampled.
    #[builder(default = 0)]
    pub pointer_id: i32,
    /// Gesture (continuous) input when true, discrete taps otherwise.
    #[builder(default = true)]
    pub geometric: bool,
}

impl InputMode {
    pub fn gesture() -> Self {
        Self::builder().build()
    }

    pub fn typing() -> Self {
        Self::builder().geometric(false).build()
    }
}

impl Default for InputMode {
    fn default() -> Self {
        Self::gesture()
    }
}

pub struct GestureState {
    info: Arc<ProximityInfo>,
    params: DecoderParams,
    updated_by_geometric_input: bool,
    continuous_suggestion_possible: bool,
    touch_position_correction_enabled: bool,
    proximities: Vec<ProximityCodes>,
    primary_input_word: Vec<CodePoint>,
    points: Vec<SampledPoint>,
    speed_rates: Vec<f32>,
    beeline_speed_percentiles: Vec<i32>,
    directions: Vec<f32>,
    /// `points.len() * key_count` normalized squared point-to-key distances.
    normalized_squared_lengths: Vec<f32>,
    distributions: Vec<KeyDistribution>,
    search_key_sets: Vec<KeySet>,
    search_key_vectors: Vec<Vec<CodePoint>>,
    most_probable_string: Vec<CodePoint>,
    most_probable_cost: f32,
    average_speed: f32,
}

impl GestureState {
    pub fn new(info: Arc<ProximityInfo>, params: DecoderParams) -> Self {
        Self {
            info,
            params,
            updated_by_geometric_input: false,
            continuous_suggestion_possible: false,
            touch_position_correction_enabled: false,
            proximities: Vec::new(),
            primary_input_word: Vec::new(),
            points: Vec::new(),
            speed_rates: Vec::new(),
            beeline_speed_percentiles: Vec::new(),
            directions: Vec::new(),
            normalized_squared_lengths: Vec::new(),
            distributions: Vec::new(),
            search_key_sets: Vec::new(),
            search_key_vectors: Vec::new(),
            most_probable_string: Vec::new(),
            most_probable_cost: 0.0,
            average_speed: 0.0,
        }
    }

    /// Refreshes the state from the full trace seen so far and returns the sampled size.
    ///
    /// Typed input fails with [`DecoderError::Capacity`] when it has `MAX_WORD_LENGTH` points or
    /// more, or when a tap has more candidate codes than a proximity buffer holds (possible on
    /// dense custom layouts once locale additions are appended). Candidates are never dropped
    /// to make room. On any error the state is left exactly as it was before the call.
    pub fn update(&mut self, trace: &InputTrace, mode: &InputMode) -> DgResult<usize> {
        trace.validate()?;
        if mode.geometric && !trace.is_empty() && !trace.has_times() {
            return Err(DecoderError::TraceShape(
                "gesture input needs timestamps".to_string(),
            ));
        }
        if !mode.geometric && trace.len() >= MAX_WORD_LENGTH {
            return Err(DecoderError::Capacity {
                what: "typed word",
                capacity: MAX_WORD_LENGTH - 1,
            });
        }

        let proximities = if !mode.geometric && mode.pointer_id == 0 {
            let codes: Vec<CodePoint> = (0..trace.len()).map(|i| trace.code_at(i)).collect();
            self.info.initialize_proximities(
                &codes,
                &trace.xs,
                &trace.ys,
                &self.params.search.locale,
            )?
        } else {
            Vec::new()
        };

        self.continuous_suggestion_possible = self.updated_by_geometric_input == mode.geometric
            && self.is_continuation_of_samples(trace);
        self.proximities = proximities;
        self.most_probable_string.clear();
        self.most_probable_cost = 0.0;

        let (start_index, last_saved) =
            if self.continuous_suggestion_possible && self.points.len() > 1 {
                // The last two points may move once more input arrives.
                let next_start = self.points[self.points.len() - 2].input_index;
                self.points.truncate(self.points.len() - 2);
                (next_start, self.points.len())
            } else {
                self.clear_samples();
                (0, 0)
            };
        debug!(
            continuous = self.continuous_suggestion_possible,
            reused = last_saved,
            start_index,
            "refreshing gesture state"
        );

        let sampler = sampling::Sampler {
            info: &self.info,
            params: &self.params.sampling,
            geometric: mode.geometric,
        };
        let size = sampler.update_touch_points(
            trace,
            &self.proximities,
            mode.pointer_id,
            start_index,
            &mut self.points,
        );

        if size > 0 && mode.geometric {
            self.average_speed = speed::refresh_speed_rates(
                &self.params.sampling,
                trace,
                last_saved,
                &self.points,
                &mut self.speed_rates,
                &mut self.directions,
            );
            self.beeline_speed_percentiles = speed::beeline_speed_percentiles(
                &self.params.sampling,
                self.info.most_common_key_width(),
                self.average_speed,
                trace,
                &self.points,
            );
        }

        if size > 0 {
            self.refresh_normalized_squared_lengths(last_saved, mode.geometric);
            if mode.geometric {
                let assigner = probability::ProbabilityAssigner {
                    info: &self.info,
                    params: &self.params.probability,
                    max_point_to_key_length: self.params.sampling.max_point_to_key_length,
                };
                assigner.update_align_point_probabilities(
                    last_saved,
                    &self.points,
                    &self.speed_rates,
                    &self.normalized_squared_lengths,
                    &mut self.distributions,
                );
                search::update_search_key_sets(
                    &self.info,
                    self.params.search.search_key_radius_ratio,
                    last_saved,
                    &self.points,
                    &self.distributions,
                    &mut self.search_key_sets,
                    &mut self.search_key_vectors,
                );
                let (word, cost) = probability::most_probable_string(
                    &self.info,
                    self.params.search.demotion_log_probability,
                    &self.distributions,
                );
                self.most_probable_string = word;
                self.most_probable_cost = cost;
            }
        }

        self.touch_position_correction_enabled = size > 0
            && size < MAX_WORD_LENGTH
            && self.info.has_touch_position_correction_data();
        self.primary_input_word = self.proximities.iter().map(|p| p.primary()).collect();
        self.updated_by_geometric_input = mode.geometric;
        debug!(raw = trace.len(), sampled = size, "gesture state refreshed");
        Ok(size)
    }

    /// Drops every sample, keeping the spatial model and parameters.
    pub fn reset(&mut self) {
        self.clear_samples();
        self.proximities.clear();
        self.primary_input_word.clear();
        self.most_probable_string.clear();
        self.most_probable_cost = 0.0;
        self.continuous_suggestion_possible = false;
        self.touch_position_correction_enabled = false;
        self.updated_by_geometric_input = false;
    }

    fn clear_samples(&mut self) {
        self.points.clear();
        self.speed_rates.clear();
        self.beeline_speed_percentiles.clear();
        self.directions.clear();
        self.normalized_squared_lengths.clear();
        self.distributions.clear();
        self.search_key_sets.clear();
        self.search_key_vectors.clear();
        self.average_speed = 0.0;
    }

    /// True when every sampled point still sits at its recorded raw index in `trace`.
    fn is_continuation_of_samples(&self, trace: &InputTrace) -> bool {
        if self.points.is_empty() || trace.len() < self.points.len() {
            return false;
        }
        self.points.iter().all(|p| {
            p.input_index < trace.len()
                && trace.xs[p.input_index] == p.x
                && trace.ys[p.input_index] == p.y
                && (!trace.has_times() || trace.time_at(p.input_index) == p.time)
        })
    }

    fn refresh_normalized_squared_lengths(&mut self, last_saved: usize, geometric: bool) {
        let key_count = self.info.key_count();
        self.normalized_squared_lengths
            .resize(self.points.len() * key_count, 0.0);
        for (i, p) in self.points.iter().enumerate().skip(last_saved) {
            for k in 0..key_count {
                self.normalized_squared_lengths[i * key_count + k] = self
                    .info
                    .normalized_squared_distance_from_center(k, p.x, p.y, geometric);
            }
        }
    }

    pub fn proximity_info(&self) -> &Arc<ProximityInfo> {
        &self.info
    }

    pub fn params(&self) -> &DecoderParams {
        &self.params
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    pub fn is_used(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn points(&self) -> &[SampledPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&SampledPoint> {
        self.points.get(index)
    }

    pub fn average_speed(&self) -> f32 {
        self.average_speed
    }

    pub fn is_continuous_suggestion_possible(&self) -> bool {
        self.continuous_suggestion_possible
    }

    pub fn touch_position_correction_enabled(&self) -> bool {
        self.touch_position_correction_enabled
    }

    /// Local speed divided by the trace average; 1.0 when unknown.
    pub fn speed_rate(&self, index: usize) -> f32 {
        self.speed_rates.get(index).copied().unwrap_or(1.0)
    }

    pub fn beeline_speed_percentile(&self, index: usize) -> i32 {
        self.beeline_speed_percentiles
            .get(index)
            .copied()
            .unwrap_or(crate::consts::MAX_PERCENTILE)
    }

    pub fn double_letter_level(&self, index: usize) -> DoubleLetterLevel {
        let percentile = self.beeline_speed_percentile(index);
        if percentile == 0 {
            DoubleLetterLevel::AStrongDoubleLetter
        } else if percentile < self.params.sampling.min_double_letter_beeline_speed_percentile {
            DoubleLetterLevel::ADoubleLetter
        } else {
            DoubleLetterLevel::NotADoubleLetter
        }
    }

    /// Direction from sampled point `index` to the next one.
    pub fn direction_at(&self, index: usize) -> f32 {
        self.directions.get(index).copied().unwrap_or(0.0)
    }

    pub fn direction(&self, index0: usize, index1: usize) -> f32 {
        direction_between(&self.points, index0, index1)
    }

    pub fn point_angle(&self, index: usize) -> f32 {
        point_angle(&self.points, index)
    }

    pub fn points_angle(&self, index0: usize, index1: usize, index2: usize) -> f32 {
        points_angle(&self.points, index0, index1, index2)
    }

    pub fn distribution(&self, index: usize) -> Option<&KeyDistribution> {
        self.distributions.get(index)
    }

    /// Cost of aligning sampled point `index` to `key`.
    pub fn probability(&self, index: usize, key: usize) -> f32 {
        self.distributions
            .get(index)
            .and_then(|d| d.cost_of(key))
            .unwrap_or(MAX_VALUE_FOR_WEIGHTING_F32)
    }

    pub fn skip_cost(&self, index: usize) -> f32 {
        self.distributions
            .get(index)
            .map_or(MAX_VALUE_FOR_WEIGHTING_F32, |d| d.skip)
    }

    pub fn search_key_set(&self, index: usize) -> KeySet {
        self.search_key_sets.get(index).copied().unwrap_or_default()
    }

    pub fn search_key_vector(&self, index: usize) -> &[CodePoint] {
        self.search_key_vectors
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_key_in_search_keys_after_index(&self, index: usize, key: usize) -> bool {
        self.search_key_set(index).test(key)
    }

    pub fn proximity_type_g(&self, index: usize, code: CodePoint) -> ProximityType {
        if !self.is_used() {
            return ProximityType::UnrelatedChar;
        }
        let lower = to_lower_case(code);
        let base_lower = to_base_code_point(lower);
        if self
            .search_key_vector(index)
            .iter()
            .any(|&c| c == lower || c == base_lower)
        {
            ProximityType::MatchChar
        } else {
            ProximityType::UnrelatedChar
        }
    }

    pub fn point_to_key_by_id_length(&self, index: usize, key: usize) -> f32 {
        let key_count = self.info.key_count();
        if key >= key_count {
            return MAX_VALUE_FOR_WEIGHTING_F32;
        }
        self.normalized_squared_lengths
            .get(index * key_count + key)
            .map_or(MAX_VALUE_FOR_WEIGHTING_F32, |&d| {
                d.min(self.params.sampling.max_point_to_key_length)
            })
    }

    pub fn point_to_key_length(&self, index: usize, code: CodePoint) -> f32 {
        if let Some(key) = self.info.key_index_of(code) {
            return self.point_to_key_by_id_length(index, key);
        }
        if is_intentional_omission(code) {
            return 0.0;
        }
        MAX_VALUE_FOR_WEIGHTING_F32
    }

    pub fn has_space_proximity_at(&self, index: usize) -> bool {
        self.points
            .get(index)
            .is_some_and(|p| self.info.has_space_proximity(p.x, p.y))
    }

    /// Greedy decode of the current distributions and its summed cost.
    pub fn most_probable_string(&self) -> (&[CodePoint], f32) {
        (&self.most_probable_string, self.most_probable_cost)
    }

    pub fn most_probable_word(&self) -> String {
        self.most_probable_string
            .iter()
            .filter_map(|&c| crate::chars::code_point_to_char(c))
            .collect()
    }

    pub fn proximity_codes_at(&self, index: usize) -> Option<&ProximityCodes> {
        self.proximities.get(index)
    }

    pub fn primary_code_point_at(&self, index: usize) -> CodePoint {
        self.proximities
            .get(index)
            .map_or(NOT_A_CODE_POINT, |p| p.primary())
    }

    pub fn primary_original_code_point_at(&self, index: usize) -> CodePoint {
        self.info
            .key_index_of(self.primary_code_point_at(index))
            .map_or(NOT_A_CODE_POINT, |k| self.info.original_code_point_of(k))
    }

    pub fn primary_input_word(&self) -> &[CodePoint] {
        &self.primary_input_word
    }

    pub fn same_as_typed(&self, word: &[CodePoint]) -> bool {
        word.len() == self.points.len()
            && word.len() == self.proximities.len()
            && self
                .proximities
                .iter()
                .zip(word)
                .all(|(p, &c)| p.primary() == c)
    }

    pub fn exists_code_point_in_proximity_at(&self, index: usize, code: CodePoint) -> bool {
        self.proximities.get(index).is_some_and(|p| {
            p.raw().iter().take_while(|&&c| c > 0).any(|&c| c == code)
        })
    }

    /// Whether the primary code at `index` is a neighbor of the previous or next tap.
    pub fn exists_adjacent_proximity_chars(&self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        let current = self.primary_code_point_at(index);
        (index > 0 && self.exists_code_point_in_proximity_at(index - 1, current))
            || self.exists_code_point_in_proximity_at(index + 1, current)
    }

    /// Classifies `code` against what was typed at `index`.
    pub fn proximity_type(
        &self,
        index: usize,
        code: CodePoint,
        check_proximity_chars: bool,
    ) -> ProximityType {
        let Some(codes) = self.proximities.get(index) else {
            return ProximityType::SubstitutionChar;
        };
        let raw = codes.raw();
        let first = raw[0];
        let base_lower = to_base_lower_case(code);
        if first == base_lower || first == code {
            return ProximityType::MatchChar;
        }
        if !check_proximity_chars {
            return ProximityType::SubstitutionChar;
        }
        if to_base_lower_case(first) == base_lower {
            return ProximityType::ProximityChar;
        }

        let matches = |c: CodePoint| c == base_lower || c == code;
        let mut j = 1;
        while j < raw.len() && raw[j] > ADDITIONAL_PROXIMITY_CHAR_DELIMITER_CODE {
            if matches(raw[j]) {
                return ProximityType::ProximityChar;
            }
            j += 1;
        }
        if j < raw.len() && raw[j] == ADDITIONAL_PROXIMITY_CHAR_DELIMITER_CODE {
            if raw[j + 1..]
                .iter()
                .take_while(|&&c| c > ADDITIONAL_PROXIMITY_CHAR_DELIMITER_CODE)
                .any(|&c| matches(c))
            {
                return ProximityType::AdditionalProximityChar;
            }
        }
        ProximityType::SubstitutionChar
    }
}

pub(crate) fn direction_between(points: &[SampledPoint], index0: usize, index1: usize) -> f32 {
    match (points.get(index0), points.get(index1)) {
        (Some(p0), Some(p1)) => angle(p0.x, p0.y, p1.x, p1.y),
        _ => 0.0,
    }
}

/// Turning angle at an interior point; 0 at both ends.
pub(crate) fn point_angle(points: &[SampledPoint], index: usize) -> f32 {
    if index == 0 || index + 1 >= points.len() {
        return 0.0;
    }
    let previous = direction_between(points, index - 1, index);
    let next = direction_between(points, index, index + 1);
    angle_diff(previous, next)
}

pub(crate) fn points_angle(
    points: &[SampledPoint],
    index0: usize,
    index1: usize,
    index2: usize,
) -> f32 {
    let n = points.len();
    if index0 >= n || index1 >= n || index2 >= n {
        return 0.0;
    }
    let previous = direction_between(points, index0, index1);
    let next = direction_between(points, index1, index2);
    angle_diff(previous, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_set_tracks_bits() {
        let mut set = KeySet::default();
        set.set(0);
        set.set(63);
        set.set(64);
        assert!(set.test(0) && set.test(63));
        assert!(!set.test(64));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 63]);
        set.reset();
        assert!(set.is_empty());
    }

    #[test]
    fn ranked_orders_by_cost() {
        let mut d = KeyDistribution::default();
        d.keys.insert(3, 2.0);
        d.keys.insert(1, 0.5);
        d.keys.insert(2, 0.5);
        assert_eq!(d.ranked(), vec![(1, 0.5), (2, 0.5), (3, 2.0)]);
    }
}
