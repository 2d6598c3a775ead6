use crate::error::DgResult;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

/// Every tunable of the decoder. Values were picked experimentally; all of them can be
/// overridden from a JSON file and then from the command line.
#[derive(Args, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderParams {
    #[command(flatten)]
    pub sampling: SamplingParams,
    #[command(flatten)]
    pub probability: ProbabilityParams,
    #[command(flatten)]
    pub search: SearchParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Normalized squared distance below which a key counts as "near" a raw point.
    #[arg(long, default_value_t = 2.0)]
    pub near_key_threshold_for_distance: f32,
    #[arg(long, default_value_t = 0.6)]
    pub near_key_threshold_for_point_score: f32,
    #[arg(long, default_value_t = 100.0)]
    pub distance_base_scale: f32,
    #[arg(long, default_value_t = 25.0)]
    pub corner_check_distance_threshold_scale: f32,
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub not_localmin_distance_score: f32,
    #[arg(long, default_value_t = 1.0)]
    pub localmin_distance_and_near_to_key_score: f32,
    #[arg(long, default_value_t = PI * 2.0 / 3.0)]
    pub corner_angle_threshold_for_point_score: f32,
    #[arg(long, default_value_t = PI / 4.0)]
    pub corner_sum_angle_threshold: f32,
    #[arg(long, default_value_t = 1.0)]
    pub corner_score: f32,
    /// The final raw point is dropped when `distance * scale < most common key width`.
    #[arg(long, default_value_t = 4.0)]
    pub last_point_skip_distance_scale: f32,
    #[arg(long, default_value_t = 0.01)]
    pub margin_for_prev_local_min: f32,
    /// Raw points looked at on each side of a sample for its speed.
    #[arg(long, default_value_t = 2)]
    pub num_points_for_speed_calculation: usize,
    /// Beeline lookup radius, in percent of the most common key width.
    #[arg(long, default_value_t = 50)]
    pub lookup_radius_percentile: i32,
    #[arg(long, default_value_t = 150)]
    pub first_point_time_offset_millis: i32,
    #[arg(long, default_value_t = 600)]
    pub strong_double_letter_time_millis: i32,
    #[arg(long, default_value_t = 5)]
    pub min_double_letter_beeline_speed_percentile: i32,
    /// Upper bound applied to every normalized point-to-key distance.
    #[arg(long, default_value_t = 1.0)]
    pub max_point_to_key_length: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            near_key_threshold_for_distance: 2.0,
            near_key_threshold_for_point_score: 0.6,
            distance_base_scale: 100.0,
            corner_check_distance_threshold_scale: 25.0,
            not_localmin_distance_score: -1.0,
            localmin_distance_and_near_to_key_score: 1.0,
            corner_angle_threshold_for_point_score: PI * 2.0 / 3.0,
            corner_sum_angle_threshold: PI / 4.0,
            corner_score: 1.0,
            last_point_skip_distance_scale: 4.0,
            margin_for_prev_local_min: 0.01,
            num_points_for_speed_calculation: 2,
            lookup_radius_percentile: 50,
            first_point_time_offset_millis: 150,
            strong_double_letter_time_millis: 600,
            min_double_letter_beeline_speed_percentile: 5,
            max_point_to_key_length: 1.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilityParams {
    /// Key masses below this floor are dropped before the log conversion.
    #[arg(long, default_value_t = 0.000005)]
    pub min_probability: f32,
    #[arg(long, default_value_t = 0.95)]
    pub max_skip_probability: f32,
    #[arg(long, default_value_t = 0.01)]
    pub skip_first_point_probability: f32,
    #[arg(long, default_value_t = 0.1)]
    pub skip_last_point_probability: f32,
    #[arg(long, default_value_t = 0.15)]
    pub min_speed_rate_for_skip_probability: f32,
    #[arg(long, default_value_t = 0.9)]
    pub speed_weight_for_skip_probability: f32,
    #[arg(long, default_value_t = 0.6)]
    pub slow_straight_weight_for_skip_probability: f32,
    #[arg(long, default_value_t = 0.5)]
    pub nearest_distance_weight: f32,
    #[arg(long, default_value_t = 0.5)]
    pub nearest_distance_bias: f32,
    #[arg(long, default_value_t = 0.6)]
    pub nearest_distance_weight_for_last: f32,
    #[arg(long, default_value_t = 0.4)]
    pub nearest_distance_bias_for_last: f32,
    #[arg(long, default_value_t = 0.9)]
    pub angle_weight: f32,
    #[arg(long, default_value_t = PI / 3.0)]
    pub deep_corner_angle_threshold: f32,
    #[arg(long, default_value_t = 0.1)]
    pub skip_deep_corner_probability: f32,
    #[arg(long, default_value_t = PI / 6.0)]
    pub corner_angle_threshold: f32,
    #[arg(long, default_value_t = PI / 12.0)]
    pub straight_angle_threshold: f32,
    #[arg(long, default_value_t = 0.4)]
    pub skip_corner_probability: f32,
    #[arg(long, default_value_t = 0.1)]
    pub speed_margin: f32,

    // Gaussian spread, in units of the most common key width.
    #[arg(long, default_value_t = 0.3)]
    pub speedxangle_weight_for_standard_deviation: f32,
    #[arg(long, default_value_t = 0.25)]
    pub max_speedxangle_rate_for_standard_deviation: f32,
    #[arg(long, default_value_t = 0.5)]
    pub speedxnearest_weight_for_standard_deviation: f32,
    #[arg(long, default_value_t = 0.15)]
    pub max_speedxnearest_rate_for_standard_deviation: f32,
    #[arg(long, default_value_t = 0.37)]
    pub min_standard_deviation: f32,
    #[arg(long, default_value_t = 1.25)]
    pub standard_deviation_x_weight_for_first: f32,
    #[arg(long, default_value_t = 0.85)]
    pub standard_deviation_y_weight_for_first: f32,
    #[arg(long, default_value_t = 1.4)]
    pub standard_deviation_x_weight_for_last: f32,
    #[arg(long, default_value_t = 0.95)]
    pub standard_deviation_y_weight_for_last: f32,
    #[arg(long, default_value_t = 1.1)]
    pub standard_deviation_x_weight: f32,
    #[arg(long, default_value_t = 0.95)]
    pub standard_deviation_y_weight: f32,

    // Cross-point suppression.
    #[arg(long, default_value_t = 1.5)]
    pub suppression_length_weight: f32,
    #[arg(long, default_value_t = 0.5)]
    pub min_suppression_rate: f32,
    #[arg(long, default_value_t = 0.5)]
    pub suppression_weight: f32,
    #[arg(long, default_value_t = 0.1)]
    pub suppression_weight_for_probability_gain: f32,
    #[arg(long, default_value_t = 0.3)]
    pub skip_probability_weight_for_probability_gain: f32,
}

impl Default for ProbabilityParams {
    fn default() -> Self {
        Self {
            min_probability: 0.000005,
            max_skip_probability: 0.95,
            skip_first_point_probability: 0.01,
            skip_last_point_probability: 0.1,
            min_speed_rate_for_skip_probability: 0.15,
            speed_weight_for_skip_probability: 0.9,
            slow_straight_weight_for_skip_probability: 0.6,
            nearest_distance_weight: 0.5,
            nearest_distance_bias: 0.5,
            nearest_distance_weight_for_last: 0.6,
            nearest_distance_bias_for_last: 0.4,
            angle_weight: 0.9,
            deep_corner_angle_threshold: PI / 3.0,
            skip_deep_corner_probability: 0.1,
            corner_angle_threshold: PI / 6.0,
            straight_angle_threshold: PI / 12.0,
            skip_corner_probability: 0.4,
            speed_margin: 0.1,
            speedxangle_weight_for_standard_deviation: 0.3,
            max_speedxangle_rate_for_standard_deviation: 0.25,
            speedxnearest_weight_for_standard_deviation: 0.5,
            max_speedxnearest_rate_for_standard_deviation: 0.15,
            min_standard_deviation: 0.37,
            standard_deviation_x_weight_for_first: 1.25,
            standard_deviation_y_weight_for_first: 0.85,
            standard_deviation_x_weight_for_last: 1.4,
            standard_deviation_y_weight_for_last: 0.95,
            standard_deviation_x_weight: 1.1,
            standard_deviation_y_weight: 0.95,
            suppression_length_weight: 1.5,
            min_suppression_rate: 0.5,
            suppression_weight: 0.5,
            suppression_weight_for_probability_gain: 0.1,
            skip_probability_weight_for_probability_gain: 0.3,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Added to every key cost in the greedy decoder so skipping wins only when clearly cheaper.
    #[arg(long, default_value_t = 0.3)]
    pub demotion_log_probability: f32,
    /// Search-key lookahead, as a fraction of the keyboard diagonal.
    #[arg(long, default_value_t = 0.95)]
    pub search_key_radius_ratio: f32,
    #[arg(long, default_value = "en_US")]
    pub locale: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            demotion_log_probability: 0.3,
            search_key_radius_ratio: 0.95,
            locale: "en_US".to_string(),
        }
    }
}

impl DecoderParams {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> DgResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overrides values from a file with the ones the user actually typed on the command line.
    pub fn merge_from_cli(&mut self, cli: &DecoderParams, matches: &ArgMatches) {
        self.sampling.merge_from_cli(&cli.sampling, matches);
        self.probability.merge_from_cli(&cli.probability, matches);
        self.search.merge_from_cli(&cli.search, matches);
    }
}

macro_rules! update_if_present {
    ($self:ident, $cli:ident, $matches:ident, $($field:ident),+ $(,)?) => {
        $(
            if $matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                $self.$field = $cli.$field.clone();
            }
        )+
    };
}

impl SamplingParams {
    pub fn merge_from_cli(&mut self, cli: &SamplingParams, matches: &ArgMatches) {
        update_if_present!(
            self,
            cli,
            matches,
            near_key_threshold_for_distance,
            near_key_threshold_for_point_score,
            distance_base_scale,
            corner_check_distance_threshold_scale,
            not_localmin_distance_score,
            localmin_distance_and_near_to_key_score,
            corner_angle_threshold_for_point_score,
            corner_sum_angle_threshold,
            corner_score,
            last_point_skip_distance_scale,
            margin_for_prev_local_min,
            num_points_for_speed_calculation,
            lookup_radius_percentile,
            first_point_time_offset_millis,
            strong_double_letter_time_millis,
            min_double_letter_beeline_speed_percentile,
            max_point_to_key_length,
        );
    }
}

impl ProbabilityParams {
    pub fn merge_from_cli(&mut self, cli: &ProbabilityParams, matches: &ArgMatches) {
        update_if_present!(
            self,
            cli,
            matches,
            min_probability,
            max_skip_probability,
            skip_first_point_probability,
            skip_last_point_probability,
            min_speed_rate_for_skip_probability,
            speed_weight_for_skip_probability,
            slow_straight_weight_for_skip_probability,
            nearest_distance_weight,
            nearest_distance_bias,
            nearest_distance_weight_for_last,
            nearest_distance_bias_for_last,
            angle_weight,
            deep_corner_angle_threshold,
            skip_deep_corner_probability,
            corner_angle_threshold,
            straight_angle_threshold,
            skip_corner_probability,
            speed_margin,
            speedxangle_weight_for_standard_deviation,
            max_speedxangle_rate_for_standard_deviation,
            speedxnearest_weight_for_standard_deviation,
            max_speedxnearest_rate_for_standard_deviation,
            min_standard_deviation,
            standard_deviation_x_weight_for_first,
            standard_deviation_y_weight_for_first,
            standard_deviation_x_weight_for_last,
            standard_deviation_y_weight_for_last,
            standard_deviation_x_weight,
            standard_deviation_y_weight,
            suppression_length_weight,
            min_suppression_rate,
            suppression_weight,
            suppression_weight_for_probability_gain,
            skip_probability_weight_for_probability_gain,
        );
    }
}

impl SearchParams {
    pub fn merge_from_cli(&mut self, cli: &SearchParams, matches: &ArgMatches) {
        update_if_present!(
            self,
            cli,
            matches,
            demotion_log_probability,
            search_key_radius_ratio,
            locale
        );
    }
}
