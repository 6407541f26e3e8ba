//! Names for MIDI numbers, and how Pocket Orchestra reads program numbers

/// The name of a note, e.g. "c#4"
///
/// Octaves begin on A here, not on C. Note 9 is "a0"; anything lower is simply "low".
pub fn note_name(note: u8) -> String {
    const TONES: [&str; 12] = [
        "a", "a#", "b", "c", "c#", "d", "d#", "e", "f", "f#", "g", "g#",
    ];

    match note {
        0..=8 => "low".to_owned(),
        128..=u8::MAX => "high".to_owned(),
        note => {
            let index = note - 9;
            format!("{}{}", TONES[usize::from(index % 12)], index / 12)
        }
    }
}

/// The General MIDI name of a (zero-based) program
pub fn program_name(program: u8) -> Option<&'static str> {
    GM_PROGRAM_NAMES.get(usize::from(program)).copied()
}

/// The General MIDI percussion name for a note on the drum channel
///
/// Only notes 35 through 81 have one.
pub fn drum_name(note: u8) -> Option<&'static str> {
    usize::from(note)
        .checked_sub(FIRST_DRUM)
        .and_then(|index| GM_DRUM_NAMES.get(index))
        .copied()
}

/// The wave (instrument) part of a Pocket Orchestra program: its low three bits
pub fn wave(program: u8) -> u8 {
    program & 0x07
}

/// The input part of a Pocket Orchestra program: bits 3 to 5
///
/// Zero means the channel isn't played by any input.
pub fn input(program: u8) -> u8 {
    (program >> 3) & 0x07
}

/// A short human description of a Pocket Orchestra program, e.g. "0x0a (wave 2, input 1)"
pub fn describe_program(program: u8) -> String {
    format!(
        "{program:#04x} (wave {}, input {})",
        wave(program),
        input(program)
    )
}

const FIRST_DRUM: usize = 35;

/// The 128 General MIDI program names, indexed by zero-based program number
const GM_PROGRAM_NAMES: [&str; 128] = [
    "Acoustic Grand Piano",
    "Bright Acoustic Piano",
    "Electric Grand Piano",
    "Honky-tonk Piano",
    "Electric Piano 1 (Rhodes Piano)",
    "Electric Piano 2 (Chorused Piano)",
    "Harpsichord",
    "Clavinet",
    "Celesta",
    "Glockenspiel",
    "Music Box",
    "Vibraphone",
    "Marimba",
    "Xylophone",
    "Tubular Bells",
    "Dulcimer (Santur)",
    "Drawbar Organ (Hammond)",
    "Percussive Organ",
    "Rock Organ",
    "Church Organ",
    "Reed Organ",
    "Accordion (French)",
    "Harmonica",
    "Tango Accordion (Band neon)",
    "Acoustic Guitar (nylon)",
    "Acoustic Guitar (steel)",
    "Electric Guitar (jazz)",
    "Electric Guitar (clean)",
    "Electric Guitar (muted)",
    "Overdriven Guitar",
    "Distortion Guitar",
    "Guitar harmonics",
    "Acoustic Bass",
    "Electric Bass (fingered)",
    "Electric Bass (picked)",
    "Fretless Bass",
    "Slap Bass 1",
    "Slap Bass 2",
    "Synth Bass 1",
    "Synth Bass 2",
    "Violin",
    "Viola",
    "Cello",
    "Contrabass",
    "Tremolo Strings",
    "Pizzicato Strings",
    "Orchestral Harp",
    "Timpani",
    "String Ensemble 1 (strings)",
    "String Ensemble 2 (slow strings)",
    "SynthStrings 1",
    "SynthStrings 2",
    "Choir Aahs",
    "Voice Oohs",
    "Synth Voice",
    "Orchestra Hit",
    "Trumpet",
    "Trombone",
    "Tuba",
    "Muted Trumpet",
    "French Horn",
    "Brass Section",
    "SynthBrass 1",
    "SynthBrass 2",
    "Soprano Sax",
    "Alto Sax",
    "Tenor Sax",
    "Baritone Sax",
    "Oboe",
    "English Horn",
    "Bassoon",
    "Clarinet",
    "Piccolo",
    "Flute",
    "Recorder",
    "Pan Flute",
    "Blown Bottle",
    "Shakuhachi",
    "Whistle",
    "Ocarina",
    "Lead 1 (square wave)",
    "Lead 2 (sawtooth wave)",
    "Lead 3 (calliope)",
    "Lead 4 (chiffer)",
    "Lead 5 (charang)",
    "Lead 6 (voice solo)",
    "Lead 7 (fifths)",
    "Lead 8 (bass + lead)",
    "Pad 1 (new age Fantasia)",
    "Pad 2 (warm)",
    "Pad 3 (polysynth)",
    "Pad 4 (choir space voice)",
    "Pad 5 (bowed glass)",
    "Pad 6 (metallic pro)",
    "Pad 7 (halo)",
    "Pad 8 (sweep)",
    "FX 1 (rain)",
    "FX 2 (soundtrack)",
    "FX 3 (crystal)",
    "FX 4 (atmosphere)",
    "FX 5 (brightness)",
    "FX 6 (goblins)",
    "FX 7 (echoes, drops)",
    "FX 8 (sci-fi, star theme)",
    "Sitar",
    "Banjo",
    "Shamisen",
    "Koto",
    "Kalimba",
    "Bag pipe",
    "Fiddle",
    "Shanai",
    "Tinkle Bell",
    "Agogo",
    "Steel Drums",
    "Woodblock",
    "Taiko Drum",
    "Melodic Tom",
    "Synth Drum",
    "Reverse Cymbal",
    "Guitar Fret Noise",
    "Breath Noise",
    "Seashore",
    "Bird Tweet",
    "Telephone Ring",
    "Helicopter",
    "Applause",
    "Gunshot",
];

const GM_DRUM_NAMES: [&str; 47] = [
    "Acoustic Bass Drum",
    "Bass Drum 1",
    "Side Stick",
    "Acoustic Snare",
    "Hand Clap",
    "Electric Snare",
    "Low Floor Tom",
    "Closed Hi Hat",
    "High Floor Tom",
    "Pedal Hi-Hat",
    "Low Tom",
    "Open Hi-Hat",
    "Low-Mid Tom",
    "Hi Mid Tom",
    "Crash Cymbal 1",
    "High Tom",
    "Ride Cymbal 1",
    "Chinese Cymbal",
    "Ride Bell",
    "Tambourine",
    "Splash Cymbal",
    "Cowbell",
    "Crash Cymbal 2",
    "Vibraslap",
    "Ride Cymbal 2",
    "Hi Bongo",
    "Low Bongo",
    "Mute Hi Conga",
    "Open Hi Conga",
    "Low Conga",
    "High Timbale",
    "Low Timbale",
    "High Agogo",
    "Low Agogo",
    "Cabasa",
    "Maracas",
    "Short Whistle",
    "Long Whistle",
    "Short Guiro",
    "Long Guiro",
    "Claves",
    "Hi Wood Block",
    "Low Wood Block",
    "Mute Cuica",
    "Open Cuica",
    "Mute Triangle",
    "Open Triangle",
];
