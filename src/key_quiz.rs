use crate::music::{Accidental, Clef, NoteLetter};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single "name this note" question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChallenge {
    pub note: NoteLetter,
    pub accidental: Accidental,
    pub clef: Clef,
    pub octave: u8,
    pub display_name: String,
}

impl KeyChallenge {
    pub fn new(note: NoteLetter, accidental: Accidental, clef: Clef, octave: u8) -> Self {
        Self {
            note,
            accidental,
            clef,
            octave,
            display_name: format!("{}{}", note, accidental.symbol()),
        }
    }
}

/// Draw a random note, accidental, clef and octave
pub fn generate_key_challenge<R: Rng + ?Sized>(rng: &mut R) -> KeyChallenge {
    let note = *NoteLetter::ALL.choose(rng).unwrap_or(&NoteLetter::C);
    let accidental = if note.takes_accidental() {
        *Accidental::ALL.choose(rng).unwrap_or(&Accidental::Natural)
    } else {
        Accidental::Natural
    };
    let clef = *Clef::ALL.choose(rng).unwrap_or(&Clef::Treble);
    let octaves = clef.octaves();
    let octave = *octaves.choose(rng).unwrap_or(&octaves[0]);

    KeyChallenge::new(note, accidental, clef, octave)
}

/// Compare the bare note letter against the trimmed input, ignoring case.
/// The accidental is shown to the player but not graded.
pub fn check_answer(challenge: &KeyChallenge, user_input: &str) -> bool {
    challenge
        .note
        .to_string()
        .eq_ignore_ascii_case(user_input.trim())
}
