use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use posong_tools::inspect::{inspect, InspectArgs};
use posong_tools::optimize::{optimize, OptimizeArgs};
use posong_tools::transform::{
    merge_channels, reformat, reset_programs, zap_input, MergeChannelsArgs, TransformArgs,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
enum Cli {
    Inspect(InspectArgs),
    Optimize(OptimizeArgs),

    /// Make every note a plain note, not played by any input
    ZapInput(TransformArgs),

    /// Move input selection from programs into note velocities
    Reformat(TransformArgs),

    /// Replace all program changes with program 0 at the start of the song
    ResetPrograms(TransformArgs),

    MergeChannels(MergeChannelsArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match Cli::parse_from(wild::args()) {
        Cli::Inspect(args) => inspect(&args),
        Cli::Optimize(args) => optimize(&args),
        Cli::ZapInput(args) => zap_input(&args),
        Cli::Reformat(args) => reformat(&args),
        Cli::ResetPrograms(args) => reset_programs(&args),
        Cli::MergeChannels(args) => merge_channels(&args),
    }
}
