use crate::utils::{read_song, write_song};
use anyhow::Result;
use clap::Args;
use posong::{pipeline, song::Song, u4};
use std::path::PathBuf;

#[derive(Args)]
#[clap(author, version)]
pub struct TransformArgs {
    /// The path to the song to transform
    path: PathBuf,

    /// The output path. Defaults to overwriting the input.
    #[clap(short, long)]
    output: Option<PathBuf>,
}

/// Move every event on one channel to another
#[derive(Args)]
#[clap(author, version)]
pub struct MergeChannelsArgs {
    #[clap(flatten)]
    song: TransformArgs,

    /// The channel to move events from (0 - 15)
    #[clap(long, parse(try_from_str = parse_channel))]
    from: u4,

    /// The channel to move events to (0 - 15)
    #[clap(long, parse(try_from_str = parse_channel))]
    into: u4,
}

pub fn zap_input(args: &TransformArgs) -> Result<()> {
    transform(args, pipeline::zap_input)
}

pub fn reformat(args: &TransformArgs) -> Result<()> {
    transform(args, pipeline::reformat)
}

pub fn reset_programs(args: &TransformArgs) -> Result<()> {
    transform(args, pipeline::reset_programs)
}

pub fn merge_channels(args: &MergeChannelsArgs) -> Result<()> {
    transform(&args.song, |song| {
        pipeline::merge_channels(song, args.from, args.into)
    })
}

fn transform<F>(args: &TransformArgs, edit: F) -> Result<()>
where
    F: FnOnce(&mut Song),
{
    let mut song = read_song(&args.path)?;
    edit(&mut song);

    write_song(&song, &args.path, args.output.as_deref())
}

fn parse_channel(arg: &str) -> Result<u4, String> {
    let channel: u8 = arg
        .parse()
        .map_err(|_| format!("'{arg}' is not a channel number"))?;

    if channel > 15 {
        return Err(format!("Channel {channel} is out of range, expected 0 - 15"));
    }

    Ok(u4::new(channel))
}
