//! Musical key handling on the Camelot wheel.
//!
//! The wheel has twelve numbered positions; each carries a minor key (`A`)
//! and its relative major (`B`). Adjacent numbers are a fifth apart, so
//! neighbours on the wheel mix harmonically. Only the number contributes to
//! the feature vector: relative keys share a position.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dimension::{Dimension, KEY_WHEEL_SIZE};
use crate::error::{Error, ValidationError};

const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Major or minor tonality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
}

/// A key written in Camelot notation, e.g. `8A` (A minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CamelotKey {
    number: u8,
    mode: Mode,
}

impl CamelotKey {
    /// Build a key from its wheel number (1-12) and mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `number` is not on the wheel.
    pub fn new(number: u8, mode: Mode) -> Result<Self, Error> {
        if (1..=KEY_WHEEL_SIZE).contains(&number) {
            Ok(Self { number, mode })
        } else {
            Err(Error::InvalidKey(format!(
                "Camelot number {} is outside 1-{}",
                number, KEY_WHEEL_SIZE
            )))
        }
    }

    /// Map a pitch class (0 = C ... 11 = B) and mode onto the wheel.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if the pitch class is not in 0-11.
    pub fn from_pitch_class(pitch_class: u8, mode: Mode) -> Result<Self, ValidationError> {
        if pitch_class >= KEY_WHEEL_SIZE {
            return Err(ValidationError::OutOfRange {
                dimension: Dimension::Key,
                value: f64::from(pitch_class),
            });
        }
        let major_root = match mode {
            Mode::Major => pitch_class,
            Mode::Minor => (pitch_class + 3) % 12,
        };
        Ok(Self {
            number: (7 * major_root + 7) % 12 + 1,
            mode,
        })
    }

    pub const fn number(self) -> u8 {
        self.number
    }

    pub const fn mode(self) -> Mode {
        self.mode
    }

    /// Zero-based wheel position (number - 1).
    pub const fn position(self) -> u8 {
        self.number - 1
    }

    /// Pitch class of the tonic (0 = C).
    pub fn pitch_class(self) -> u8 {
        // 7 is its own inverse mod 12.
        let major_root = 7 * (self.number + 4) % 12;
        match self.mode {
            Mode::Major => major_root,
            Mode::Minor => (major_root + 9) % 12,
        }
    }

    /// Conventional key name using sharps, e.g. `F#m` or `C`.
    pub fn standard_name(self) -> String {
        let root = PITCH_NAMES[usize::from(self.pitch_class())];
        match self.mode {
            Mode::Major => root.to_string(),
            Mode::Minor => format!("{}m", root),
        }
    }

    /// Shortest number of wheel steps between two keys, ignoring mode.
    pub fn wheel_steps(self, other: Self) -> u8 {
        let diff = self.number.abs_diff(other.number);
        diff.min(KEY_WHEEL_SIZE - diff)
    }

    /// True for the classic harmonic-mixing moves: same key, one step
    /// around the wheel in the same mode, or the relative major/minor.
    pub fn is_harmonic_match(self, other: Self) -> bool {
        let steps = self.wheel_steps(other);
        if self.mode == other.mode {
            steps <= 1
        } else {
            steps == 0
        }
    }
}

impl fmt::Display for CamelotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.mode {
            Mode::Minor => 'A',
            Mode::Major => 'B',
        };
        write!(f, "{}{}", self.number, letter)
    }
}

impl FromStr for CamelotKey {
    type Err = Error;

    /// Accepts Camelot notation (`8A`, `12b`) or a conventional key name
    /// (`Am`, `A minor`, `F#`, `Bb major`, `C#m`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        parse_camelot(input)
            .or_else(|| parse_standard(input))
            .ok_or_else(|| Error::InvalidKey(s.to_string()))
    }
}

impl TryFrom<String> for CamelotKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CamelotKey> for String {
    fn from(key: CamelotKey) -> Self {
        key.to_string()
    }
}

fn parse_camelot(input: &str) -> Option<CamelotKey> {
    let (split, letter) = input.char_indices().last()?;
    let mode = match letter {
        'A' | 'a' => Mode::Minor,
        'B' | 'b' => Mode::Major,
        _ => return None,
    };
    let number: u8 = input[..split].trim().parse().ok()?;
    CamelotKey::new(number, mode).ok()
}

fn parse_standard(input: &str) -> Option<CamelotKey> {
    let mut chars = input.chars();
    let natural: i8 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (shift, rest) = match rest.chars().next() {
        Some(c @ ('#' | '♯')) => (1, &rest[c.len_utf8()..]),
        Some(c @ ('b' | '♭')) => (-1, &rest[c.len_utf8()..]),
        _ => (0, rest),
    };

    let mode = match rest.trim().to_ascii_lowercase().as_str() {
        "" | "maj" | "major" => Mode::Major,
        "m" | "min" | "minor" => Mode::Minor,
        _ => return None,
    };

    let pitch_class = u8::try_from((natural + shift).rem_euclid(12)).ok()?;
    CamelotKey::from_pitch_class(pitch_class, mode).ok()
}

/// A key as reported by the upstream analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawKey {
    /// Camelot notation.
    Camelot(CamelotKey),
    /// Tonic pitch class (0 = C) and mode.
    PitchClass { pitch_class: u8, mode: Mode },
    /// Zero-based wheel position, as the analyzer reported it. Only whole
    /// numbers in `0..12` are valid.
    Position(f64),
}

impl RawKey {
    /// Zero-based wheel position of this key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] for an invalid pitch class or
    /// position.
    pub fn wheel_position(self) -> Result<u8, ValidationError> {
        match self {
            Self::Camelot(key) => Ok(key.position()),
            Self::PitchClass { pitch_class, mode } => {
                CamelotKey::from_pitch_class(pitch_class, mode).map(CamelotKey::position)
            }
            Self::Position(position) => whole_wheel_position(position).ok_or(
                ValidationError::OutOfRange {
                    dimension: Dimension::Key,
                    value: position,
                },
            ),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_wheel_position(position: f64) -> Option<u8> {
    let in_range = (0.0..f64::from(KEY_WHEEL_SIZE)).contains(&position);
    (in_range && position.fract() == 0.0).then_some(position as u8)
}

impl From<CamelotKey> for RawKey {
    fn from(key: CamelotKey) -> Self {
        Self::Camelot(key)
    }
}

impl FromStr for RawKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<CamelotKey>().map(Self::Camelot)
    }
}
