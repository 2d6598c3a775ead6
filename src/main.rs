use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use keyglide::config::DecoderParams;
use keyglide::ProximityInfo;
use std::process;
use std::sync::Arc;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Built-in layout name (qwerty, dvorak, colemak, workman) or a JSON descriptor path.
    #[arg(global = true, short, long, default_value = "qwerty")]
    layout: String,

    /// JSON file with decoder tuning values. Flags given on the command line win.
    #[arg(global = true, long)]
    params: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Inspect(cmd::inspect::InspectArgs),
    Decode(cmd::decode::DecodeArgs),
    Simulate(cmd::simulate::SimulateArgs),
}

fn resolve_params(
    cli_params: &DecoderParams,
    file: Option<&str>,
    matches: &clap::ArgMatches,
) -> DecoderParams {
    let Some(path) = file else {
        return cli_params.clone();
    };
    println!("⚖️  Loading Params from: {}", path);
    let mut params = DecoderParams::load_from_file(path).unwrap_or_else(|e| {
        eprintln!("❌ {}", e);
        process::exit(1);
    });
    params.merge_from_cli(cli_params, matches);
    params
}

fn main() {
    tracing_subscriber::fmt::init();

    // Raw matches tell user input apart from defaults.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    println!("\n🚀 Initializing keyglide...");
    println!("📂 Loading Layout: {}", cli.layout);
    let layout = cmd::load_layout(&cli.layout).unwrap_or_else(|e| {
        eprintln!("❌ {}", e);
        process::exit(1);
    });
    let info = match ProximityInfo::new(&layout) {
        Ok(info) => Arc::new(info),
        Err(e) => {
            eprintln!("\n❌ FATAL ERROR BUILDING SPATIAL MODEL:");
            eprintln!("   {}", e);
            process::exit(1);
        }
    };

    let Some((_, sub_matches)) = matches.subcommand() else {
        eprintln!("❌ No command given");
        process::exit(2);
    };

    match cli.command {
        Commands::Inspect(args) => cmd::inspect::run(args, &layout, &info),
        Commands::Decode(args) => {
            let params = resolve_params(&args.params, cli.params.as_deref(), sub_matches);
            cmd::decode::run(args, params, info)
        }
        Commands::Simulate(args) => {
            let params = resolve_params(&args.params, cli.params.as_deref(), sub_matches);
            cmd::simulate::run(args, params, info)
        }
    }
}
