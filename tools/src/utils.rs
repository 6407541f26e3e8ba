use anyhow::{Context, Result};
use posong::song::Song;
use std::{io::stdin, path::Path};
use walkdir::{DirEntry, WalkDir};

/// The extensions songs are saved with
pub const SONG_EXTENSIONS: &[&str] = &["mid", "midi"];

pub fn iter_files<'a, I>(
    paths: I,
    recursive: bool,
    extensions: &'a [&'static str],
) -> impl Iterator<Item = DirEntry> + 'a
where
    I: IntoIterator + 'a,
    <I as IntoIterator>::Item: AsRef<Path>,
{
    paths
        .into_iter()
        .flat_map(move |path| {
            let mut walk_dir = WalkDir::new(path.as_ref());
            if !recursive {
                walk_dir = walk_dir.max_depth(1);
            }

            walk_dir
        })
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && !is_hidden(entry)
                && has_extension(entry.path(), extensions)
        })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    match path.extension() {
        Some(ext) => extensions
            .iter()
            .any(|extension| ext.eq_ignore_ascii_case(extension)),
        None => false,
    }
}

/// Ask whether an existing file may be overwritten
///
/// Returns `true` straight away if nothing exists at `path` yet.
pub fn check_for_overwrite(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }

    loop {
        println!(
            "{} already exists. Do you want to overwrite it? Y/n",
            path.to_string_lossy()
        );

        let mut line = String::new();
        stdin()
            .read_line(&mut line)
            .context("Could not read terminal input")?;

        match line.trim_end() {
            "Y" | "y" => return Ok(true),
            "n" | "N" => return Ok(false),
            _ => (),
        }
    }
}

pub fn read_song(path: &Path) -> Result<Song> {
    Song::from_path(path).with_context(|| format!("Could not read song {}", path.display()))
}

/// Write a song to `output`, or over `input` if no output was given
pub fn write_song(song: &Song, input: &Path, output: Option<&Path>) -> Result<()> {
    let path = output.unwrap_or(input);

    if !check_for_overwrite(path)? {
        println!("Skipped {}", path.display());
        return Ok(());
    }

    song.to_path(path)
        .with_context(|| format!("Could not write song {}", path.display()))?;
    println!("Wrote {}", path.display());

    Ok(())
}
