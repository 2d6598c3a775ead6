use crate::reports;
use clap::Args;
use keyglide::config::DecoderParams;
use keyglide::synth::{ideal_gesture, path_drift, SynthOptions};
use keyglide::{Decoder, InputMode, ProximityInfo};
use std::sync::Arc;
use std::time::Instant;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub params: DecoderParams,

    /// Comma-separated words to swipe.
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub words: Vec<String>,

    /// Uniform noise added to every generated point, in pixels.
    #[arg(short, long, default_value_t = 0)]
    pub jitter: i32,

    #[arg(long, default_value_t = 10)]
    pub step: i32,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

pub fn run(args: SimulateArgs, params: DecoderParams, info: Arc<ProximityInfo>) {
    println!("🧪 Simulating {} gestures", args.words.len());

    let mut inputs = Vec::new();
    let mut words = Vec::new();
    let mut drifts = Vec::new();
    for (i, word) in args.words.iter().enumerate() {
        let options = SynthOptions {
            step: args.step,
            jitter: args.jitter,
            seed: args.seed.map(|s| s + i as u64),
            ..SynthOptions::default()
        };
        match ideal_gesture(&word.to_lowercase(), &info, &options) {
            Ok(trace) => {
                let drift = path_drift(&word.to_lowercase(), &info, &trace);
                drifts.push(drift.unwrap_or(f32::NAN));
                inputs.push((trace, InputMode::gesture()));
                words.push(word.clone());
            }
            Err(e) => eprintln!("⚠️  Skipping '{}': {}", word, e),
        }
    }

    let decoder = Decoder::new(info, params);
    let start = Instant::now();
    let outcomes = decoder.decode_batch(&inputs);
    println!("⏱️  Decoded in {:.2?}", start.elapsed());

    let results: Vec<_> = words
        .into_iter()
        .zip(drifts)
        .zip(outcomes)
        .map(|((word, drift), outcome)| reports::SimulationRow {
            word,
            drift,
            outcome,
        })
        .collect();
    reports::print_simulation_report(&results);
}
