use crate::chars::code_point_to_char;
use crate::clock::{Clock, SystemClock};
use crate::config::DecoderParams;
use crate::consts::CodePoint;
use crate::error::DgResult;
use crate::proximity::ProximityInfo;
use crate::state::{DoubleLetterLevel, GestureState, InputMode, SampledPoint};
use crate::trace::InputTrace;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Keys kept per point in a report.
const REPORTED_KEYS_PER_POINT: usize = 3;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct KeyCost {
    pub key: usize,
    pub code_point: CodePoint,
    pub cost: f32,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PointReport {
    #[serde(flatten)]
    pub point: SampledPoint,
    pub speed_rate: f32,
    pub double_letter: DoubleLetterLevel,
    pub skip_cost: f32,
    pub top_keys: Vec<KeyCost>,
    pub search_keys: Vec<CodePoint>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DecodeReport {
    pub raw_points: usize,
    pub points: Vec<PointReport>,
    pub most_probable: String,
    pub most_probable_code_points: Vec<CodePoint>,
    pub cost: f32,
    /// Primary codes of a typed (non-gesture) input.
    pub typed_word: String,
    pub continuous: bool,
    pub elapsed_ms: u64,
}

/// Shares one spatial model between any number of gesture states.
pub struct Decoder {
    info: Arc<ProximityInfo>,
    params: DecoderParams,
    clock: Arc<dyn Clock>,
}

impl Decoder {
    pub fn new(info: Arc<ProximityInfo>, params: DecoderParams) -> Self {
        Self {
            info,
            params,
            clock: Arc::new(SystemClock::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn proximity_info(&self) -> &Arc<ProximityInfo> {
        &self.info
    }

    pub fn params(&self) -> &DecoderParams {
        &self.params
    }

    pub fn new_state(&self) -> GestureState {
        GestureState::new(Arc::clone(&self.info), self.params.clone())
    }

    /// Refreshes `state` with `trace` and summarizes the result.
    pub fn decode(
        &self,
        state: &mut GestureState,
        trace: &InputTrace,
        mode: &InputMode,
    ) -> DgResult<DecodeReport> {
        let started = self.clock.now_millis();
        state.update(trace, mode)?;
        let elapsed_ms = self.clock.now_millis().saturating_sub(started);
        Ok(self.report(state, trace.len(), elapsed_ms))
    }

    /// Decodes independent traces in parallel, one fresh state each.
    pub fn decode_batch(&self, inputs: &[(InputTrace, InputMode)]) -> Vec<DgResult<DecodeReport>> {
        info!(traces = inputs.len(), "batch decode");
        inputs
            .par_iter()
            .map(|(trace, mode)| {
                let mut state = self.new_state();
                self.decode(&mut state, trace, mode)
            })
            .collect()
    }

    fn report(&self, state: &GestureState, raw_points: usize, elapsed_ms: u64) -> DecodeReport {
        let points = state
            .points()
            .iter()
            .enumerate()
            .map(|(i, &point)| PointReport {
                point,
                speed_rate: state.speed_rate(i),
                double_letter: state.double_letter_level(i),
                skip_cost: state.skip_cost(i),
                top_keys: state
                    .distribution(i)
                    .map(|d| {
                        d.ranked()
                            .into_iter()
                            .take(REPORTED_KEYS_PER_POINT)
                            .map(|(key, cost)| KeyCost {
                                key,
                                code_point: self.info.code_point_of(key),
                                cost,
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
                search_keys: state.search_key_vector(i).to_vec(),
            })
            .collect();

        let (code_points, cost) = state.most_probable_string();
        DecodeReport {
            raw_points,
            points,
            most_probable: state.most_probable_word(),
            most_probable_code_points: code_points.to_vec(),
            cost,
            typed_word: state
                .primary_input_word()
                .iter()
                .filter_map(|&c| code_point_to_char(c))
                .collect(),
            continuous: state.is_continuous_suggestion_possible(),
            elapsed_ms,
        }
    }
}
