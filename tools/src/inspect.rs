use crate::utils::{iter_files, read_song, SONG_EXTENSIONS};
use anyhow::Result;
use clap::Args;
use humantime::format_duration;
use posong::midi::{drum_name, program_name};
use posong::song::{Event, EventKind};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Inspect songs, or even entire directories for their contents
#[derive(Args)]
#[clap(author, version)]
pub struct InspectArgs {
    /// The path(s) to inspect
    path: Vec<PathBuf>,

    /// Search the folder recursively
    #[clap(short, long)]
    recursive: bool,

    /// List every event in the song
    #[clap(short, long)]
    events: bool,
}

pub fn inspect(args: &InspectArgs) -> Result<()> {
    let paths: Vec<_> = iter_files(&args.path, args.recursive, SONG_EXTENSIONS)
        .map(|entry| entry.into_path())
        .collect();

    if let Some((last, rest)) = paths.split_last() {
        for path in rest {
            print(path, args.events)?;
            println!();
        }

        print(last, args.events)?;
    }

    Ok(())
}

fn print(path: &Path, events: bool) -> Result<()> {
    let song = read_song(path)?;
    let notes = song.events.iter().filter(|event| event.is_note()).count();

    // Sub-millisecond precision only clutters the output
    let length = Duration::from_millis(song.duration().as_millis() as u64);

    println!(
        "{:<32}f{} | {} tpq | {} s/qn",
        path.file_name().unwrap_or_default().to_string_lossy(),
        song.format,
        song.ticks_per_qnote,
        song.seconds_per_qnote
    );
    println!(
        "  tracks {}/{} | events {} | notes {} | longest {}",
        song.track_chunk_count,
        song.track_count,
        song.events.len(),
        notes,
        song.longest_event
    );
    println!(
        "  length {} ticks | {} qnotes | {}",
        song.duration_ticks(),
        song.duration_qnotes(),
        format_duration(length)
    );

    if events {
        for event in &song.events {
            match gm_name(event) {
                Some(name) => println!("{:>8} | {:>2} | {event} | {name}", event.time, event.track),
                None => println!("{:>8} | {:>2} | {event}", event.time, event.track),
            }
        }
    }

    Ok(())
}

/// The zero-based channel General MIDI keeps for percussion
const DRUM_CHANNEL: u8 = 9;

/// What a General MIDI player would make of a program change or a drum note
fn gm_name(event: &Event) -> Option<&'static str> {
    match &event.kind {
        EventKind::Program { program, .. } => program_name(*program),
        EventKind::NoteOn(note) if u8::from(note.channel) == DRUM_CHANNEL => drum_name(note.note),
        _ => None,
    }
}
