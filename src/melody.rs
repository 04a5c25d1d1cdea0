use crate::error::Result;
use crate::music::{Clef, Difficulty, Rhythm};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const MAJOR_KEYS: [&str; 13] = [
    "C", "G", "D", "A", "E", "B", "F#", "F", "Bb", "Eb", "Ab", "Db", "Gb",
];

const MINOR_KEYS: [&str; 13] = [
    "Am", "Em", "Bm", "F#m", "C#m", "G#m", "D#m", "Dm", "Gm", "Cm", "Fm", "Bbm", "Ebm",
];

const C_MAJOR: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];
const G_MAJOR: [&str; 7] = ["G", "A", "B", "C", "D", "E", "F#"];
const F_MAJOR: [&str; 7] = ["F", "G", "A", "Bb", "C", "D", "E"];

/// Everything a tier is allowed to draw from
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultySettings {
    pub time_signatures: Vec<&'static str>,
    pub key_signatures: Vec<&'static str>,
    pub rhythms: Vec<Rhythm>,
    pub measures: usize,
    /// Lowest and highest pitch, for whoever places the letters on a staff
    pub note_range: (&'static str, &'static str),
}

impl DifficultySettings {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Beginner => Self {
                time_signatures: vec!["4/4", "3/4"],
                key_signatures: vec!["C", "G", "F", "Am"],
                rhythms: vec![Rhythm::Quarter, Rhythm::Half, Rhythm::Whole],
                measures: 4,
                note_range: ("C4", "C5"),
            },
            Difficulty::Intermediate => Self {
                time_signatures: vec!["4/4", "3/4", "2/4", "6/8"],
                key_signatures: vec!["C", "G", "D", "A", "F", "Bb", "Em", "Bm", "Dm"],
                rhythms: vec![
                    Rhythm::Eighth,
                    Rhythm::Quarter,
                    Rhythm::Half,
                    Rhythm::DottedQuarter,
                ],
                measures: 8,
                note_range: ("C4", "C6"),
            },
            Difficulty::Advanced => Self {
                time_signatures: vec!["4/4", "3/4", "2/4", "6/8", "5/4", "7/8"],
                key_signatures: MAJOR_KEYS.iter().chain(MINOR_KEYS.iter()).copied().collect(),
                rhythms: vec![
                    Rhythm::Sixteenth,
                    Rhythm::Eighth,
                    Rhythm::Quarter,
                    Rhythm::Half,
                    Rhythm::Triplet,
                    Rhythm::Syncopated,
                ],
                measures: 16,
                note_range: ("C3", "C6"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MelodyNote {
    /// Letter name plus accidental, no octave
    pub note: String,
    pub rhythm: Rhythm,
    /// 1-based
    pub measure: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Melody {
    pub key_signature: String,
    pub time_signature: String,
    pub clef: Clef,
    pub difficulty: Difficulty,
    pub measures: usize,
    pub melody: Vec<MelodyNote>,
}

/// Diatonic scale used to constrain note choices.
///
/// Only C/Am, G/Em and F/Dm have their own table; every other key reads as C major.
pub fn scale_for_key(key_signature: &str) -> [&'static str; 7] {
    match key_signature {
        "C" | "Am" => C_MAJOR,
        "G" | "Em" => G_MAJOR,
        "F" | "Dm" => F_MAJOR,
        _ => C_MAJOR,
    }
}

pub fn notes_per_measure(time_signature: &str) -> usize {
    match time_signature {
        "4/4" => 4,
        "3/4" => 3,
        "2/4" => 2,
        "6/8" => 6,
        _ => 4,
    }
}

/// Build a melody for the given tier and clef
pub fn generate_melody<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
    clef: Clef,
) -> Melody {
    let settings = DifficultySettings::for_difficulty(difficulty);

    let time_signature = *settings.time_signatures.choose(rng).unwrap_or(&"4/4");
    let key_signature = *settings.key_signatures.choose(rng).unwrap_or(&"C");

    let scale = scale_for_key(key_signature);
    let slots = notes_per_measure(time_signature);

    let mut melody = Vec::with_capacity(settings.measures * slots);
    for measure in 1..=settings.measures {
        for _ in 0..slots {
            let note = *scale.choose(rng).unwrap_or(&"C");
            let rhythm = *settings.rhythms.choose(rng).unwrap_or(&Rhythm::Quarter);
            melody.push(MelodyNote {
                note: note.to_string(),
                rhythm,
                measure,
            });
        }
    }

    Melody {
        key_signature: key_signature.to_string(),
        time_signature: time_signature.to_string(),
        clef,
        difficulty,
        measures: settings.measures,
        melody,
    }
}

/// String-facing entry point: unknown names fail with `InvalidArgument`
pub fn generate_melody_named<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: &str,
    clef: &str,
) -> Result<Melody> {
    Ok(generate_melody(rng, difficulty.parse()?, clef.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PracticeError;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn melody_length_matches_measures_times_slots() {
        let mut rng = StdRng::seed_from_u64(42);
        for difficulty in Difficulty::ALL {
            for _ in 0..25 {
                let melody = generate_melody(&mut rng, difficulty, Clef::Treble);
                let settings = DifficultySettings::for_difficulty(difficulty);
                assert_eq!(melody.measures, settings.measures);
                assert_eq!(
                    melody.melody.len(),
                    settings.measures * notes_per_measure(&melody.time_signature)
                );
                assert!(melody
                    .melody
                    .iter()
                    .all(|n| settings.rhythms.contains(&n.rhythm)));
            }
        }
    }

    #[test]
    fn notes_come_from_the_key_scale() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let melody = generate_melody(&mut rng, Difficulty::Intermediate, Clef::Bass);
            let scale = scale_for_key(&melody.key_signature);
            assert!(melody.melody.iter().all(|n| scale.contains(&n.note.as_str())));
        }
    }

    #[test]
    fn measure_indices_are_one_based_and_ordered() {
        let mut rng = StdRng::seed_from_u64(9);
        let melody = generate_melody(&mut rng, Difficulty::Beginner, Clef::Treble);
        let slots = notes_per_measure(&melody.time_signature);
        for (i, note) in melody.melody.iter().enumerate() {
            assert_eq!(note.measure, i / slots + 1);
        }
    }

    #[test]
    fn beginner_bass_constraints() {
        let mut rng = StdRng::seed_from_u64(1);
        let melody = generate_melody_named(&mut rng, "beginner", "bass").unwrap();
        assert!(["4/4", "3/4"].contains(&melody.time_signature.as_str()));
        assert!(["C", "G", "F", "Am"].contains(&melody.key_signature.as_str()));
        assert_eq!(melody.measures, 4);
        assert_eq!(melody.clef, Clef::Bass);
        assert_eq!(
            melody.melody.len(),
            4 * notes_per_measure(&melody.time_signature)
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_matches!(
            generate_melody_named(&mut rng, "virtuoso", "treble"),
            Err(PracticeError::InvalidArgument(_))
        );
        assert_matches!(
            generate_melody_named(&mut rng, "beginner", "tenor"),
            Err(PracticeError::InvalidArgument(_))
        );
    }

    #[test]
    fn unlisted_keys_fall_back_to_c_major() {
        assert_eq!(scale_for_key("Db"), C_MAJOR);
        assert_eq!(scale_for_key("Bm"), C_MAJOR);
        assert_eq!(scale_for_key("Em"), G_MAJOR);
        assert_eq!(scale_for_key("Dm"), F_MAJOR);
    }

    #[test]
    fn irregular_meters_default_to_four_slots() {
        assert_eq!(notes_per_measure("6/8"), 6);
        assert_eq!(notes_per_measure("5/4"), 4);
        assert_eq!(notes_per_measure("7/8"), 4);
    }

    #[test]
    fn advanced_covers_every_key() {
        let settings = DifficultySettings::for_difficulty(Difficulty::Advanced);
        assert_eq!(settings.key_signatures.len(), 26);
        assert!(settings.key_signatures.contains(&"Gb"));
        assert!(settings.key_signatures.contains(&"Ebm"));
        assert_eq!(settings.note_range, ("C3", "C6"));
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let a = generate_melody(&mut StdRng::seed_from_u64(77), Difficulty::Advanced, Clef::Treble);
        let b = generate_melody(&mut StdRng::seed_from_u64(77), Difficulty::Advanced, Clef::Treble);
        assert_eq!(a, b);
    }
}
