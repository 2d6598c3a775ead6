use crate::reports;
use clap::Args;
use keyglide::layout::LayoutDescriptor;
use keyglide::ProximityInfo;
use std::process;

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Number of grid cells whose proximity lists are printed.
    #[arg(long, default_value_t = 8)]
    pub cells: usize,

    /// Writes the resolved descriptor, proximity table included, to this JSON file.
    #[arg(long)]
    pub save: Option<String>,
}

pub fn run(args: InspectArgs, layout: &LayoutDescriptor, info: &ProximityInfo) {
    println!("\n🔎 === SPATIAL MODEL: {} === 🔎", layout.name);
    reports::print_spatial_summary(info);
    reports::print_key_table(info);
    reports::print_proximity_sample(info, args.cells);

    if let Some(path) = &args.save {
        match layout.save_to_file(path) {
            Ok(()) => println!("💾 Descriptor written to {}", path),
            Err(e) => {
                eprintln!("❌ Could not write descriptor: {}", e);
                process::exit(1);
            }
        }
    }
}
