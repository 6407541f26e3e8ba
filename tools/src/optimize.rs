use crate::utils::{read_song, write_song};
use anyhow::Result;
use clap::Args;
use posong::pipeline::{self, OptimizeOptions};
use std::path::PathBuf;

/// Strip everything from a song the player doesn't need
///
/// Without any of the removal flags, everything is removed.
#[derive(Args)]
#[clap(author, version)]
pub struct OptimizeArgs {
    /// The path to the song to optimize
    path: PathBuf,

    /// The output path. Defaults to overwriting the input.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Shift the song back so the first note starts right away
    #[clap(long)]
    leading_silence: bool,

    /// Move whatever follows the final End of Track back onto it
    #[clap(long)]
    trailing_silence: bool,

    /// Remove channel pressure
    #[clap(long)]
    channel_pressure: bool,

    /// Remove polyphonic aftertouch
    #[clap(long)]
    aftertouch: bool,

    /// Remove pitch wheel changes
    #[clap(long)]
    wheel: bool,

    /// Remove control changes
    #[clap(long)]
    control: bool,

    /// Remove program changes to the program a channel is already on
    #[clap(long)]
    redundant_program: bool,

    /// Remove text meta events
    #[clap(long)]
    text: bool,

    /// Remove meta events other than text, tempo and End of Track
    #[clap(long)]
    meta: bool,

    /// Remove system exclusive messages
    #[clap(long)]
    sysex: bool,
}

impl OptimizeArgs {
    fn options(&self) -> OptimizeOptions {
        let options = OptimizeOptions {
            remove_leading_silence: self.leading_silence,
            remove_trailing_silence: self.trailing_silence,
            remove_channel_pressure: self.channel_pressure,
            remove_aftertouch: self.aftertouch,
            remove_wheel: self.wheel,
            remove_unknown_control: self.control,
            remove_redundant_program: self.redundant_program,
            remove_text: self.text,
            remove_unknown_meta: self.meta,
            remove_unknown_sysex: self.sysex,
        };

        if options == OptimizeOptions::default() {
            OptimizeOptions::all()
        } else {
            options
        }
    }
}

pub fn optimize(args: &OptimizeArgs) -> Result<()> {
    let mut song = read_song(&args.path)?;

    let before = song.events.len();
    pipeline::optimize(&mut song, &args.options());
    println!("Removed {} of {before} event(s)", before - song.events.len());

    write_song(&song, &args.path, args.output.as_deref())
}
