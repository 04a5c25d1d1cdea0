use crate::error::PracticeError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Skill tier used to pick time signatures, keys, rhythms and melody length
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];
}

impl FromStr for Difficulty {
    type Err = PracticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(PracticeError::InvalidArgument(format!(
                "unknown difficulty '{other}'"
            ))),
        }
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Clef {
    Treble,
    Bass,
}

impl Clef {
    pub const ALL: [Clef; 2] = [Clef::Treble, Clef::Bass];

    /// Octaves whose pitches sit comfortably on this staff
    pub fn octaves(&self) -> [u8; 2] {
        match self {
            Clef::Treble => [4, 5],
            Clef::Bass => [2, 3],
        }
    }
}

impl FromStr for Clef {
    type Err = PracticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "treble" => Ok(Clef::Treble),
            "bass" => Ok(Clef::Bass),
            other => Err(PracticeError::InvalidArgument(format!(
                "unknown clef '{other}'"
            ))),
        }
    }
}

/// Natural note letter, no accidental, no octave
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum NoteLetter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteLetter {
    pub const ALL: [NoteLetter; 7] = [
        NoteLetter::C,
        NoteLetter::D,
        NoteLetter::E,
        NoteLetter::F,
        NoteLetter::G,
        NoteLetter::A,
        NoteLetter::B,
    ];

    /// B and E are never quizzed with an accidental
    pub fn takes_accidental(&self) -> bool {
        !matches!(self, NoteLetter::B | NoteLetter::E)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    #[serde(rename = "")]
    Natural,
    #[serde(rename = "#")]
    Sharp,
    #[serde(rename = "b")]
    Flat,
}

impl Accidental {
    pub const ALL: [Accidental; 3] = [Accidental::Natural, Accidental::Sharp, Accidental::Flat];

    pub fn symbol(&self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Rhythm {
    Sixteenth,
    Eighth,
    Quarter,
    DottedQuarter,
    Half,
    Whole,
    Triplet,
    Syncopated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Beginner".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert_eq!(" advanced ".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
    }

    #[test]
    fn unknown_difficulty_is_invalid_argument() {
        assert_matches!(
            "expert".parse::<Difficulty>(),
            Err(PracticeError::InvalidArgument(_))
        );
    }

    #[test]
    fn unknown_clef_is_invalid_argument() {
        assert_matches!("alto".parse::<Clef>(), Err(PracticeError::InvalidArgument(_)));
    }

    #[test]
    fn display_matches_log_text() {
        assert_eq!(Difficulty::Intermediate.to_string(), "intermediate");
        assert_eq!(Clef::Bass.to_string(), "bass");
        assert_eq!(Rhythm::DottedQuarter.to_string(), "dotted_quarter");
        assert_eq!(NoteLetter::G.to_string(), "G");
    }

    #[test]
    fn accidental_serializes_as_symbol() {
        assert_eq!(serde_json::to_string(&Accidental::Sharp).unwrap(), r##""#""##);
        assert_eq!(serde_json::to_string(&Accidental::Natural).unwrap(), r#""""#);
    }

    #[test]
    fn only_b_and_e_refuse_accidentals() {
        let refusing: Vec<_> = NoteLetter::ALL
            .iter()
            .filter(|n| !n.takes_accidental())
            .collect();
        assert_eq!(refusing, vec![&NoteLetter::E, &NoteLetter::B]);
    }
}
