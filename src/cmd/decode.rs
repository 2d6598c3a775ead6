use crate::reports;
use clap::Args;
use keyglide::config::DecoderParams;
use keyglide::trace::loader;
use keyglide::{Decoder, InputMode, ProximityInfo};
use std::process;
use std::sync::Arc;

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub params: DecoderParams,

    /// Trace file (`.csv` with x,y[,time][,pointer_id][,code] columns, or `.json`).
    #[arg(short, long)]
    pub trace: String,

    /// Treat the points as discrete taps instead of a gesture.
    #[arg(long, default_value_t = false)]
    pub typing: bool,

    #[arg(long, default_value_t = 0)]
    pub pointer_id: i32,

    /// Print the full report as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: DecodeArgs, params: DecoderParams, info: Arc<ProximityInfo>) {
    println!("📂 Loading Trace: {}", args.trace);
    let trace = loader::load_from_file(&args.trace).unwrap_or_else(|e| {
        eprintln!("❌ {}", e);
        process::exit(1);
    });

    let mode = InputMode::builder()
        .pointer_id(args.pointer_id)
        .geometric(!args.typing)
        .build();
    let decoder = Decoder::new(info, params);
    let mut state = decoder.new_state();
    let report = decoder
        .decode(&mut state, &trace, &mode)
        .unwrap_or_else(|e| {
            eprintln!("\n❌ DECODE FAILED:");
            eprintln!("   {}", e);
            process::exit(1);
        });

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ {}", e);
                process::exit(1);
            }
        }
        return;
    }
    reports::print_decode_report(&report);
}
