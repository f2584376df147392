use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Rendered in place of a letter when no option in a question was marked.
pub const NO_ANSWER_MARKER: &str = "-";

/// Letters beyond `Z` have no representation.
pub const MAX_OPTIONS_PER_QUESTION: usize = 26;

/// An option letter, `A` for the leftmost bubble of a question.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionLetter(char);

impl OptionLetter {
    /// Gets the letter for the zero-based option index, left to right.
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= MAX_OPTIONS_PER_QUESTION {
            return None;
        }
        Some(Self((b'A' + index as u8) as char))
    }

    /// Parses a letter case-insensitively.
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii_alphabetic() {
            Some(Self(c.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn index(&self) -> usize {
        (self.0 as u8 - b'A') as usize
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl Display for OptionLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for OptionLetter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OptionLetter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut chars = s.chars();
        match (chars.next().and_then(OptionLetter::from_char), chars.next()) {
            (Some(letter), None) => Ok(letter),
            _ => Err(serde::de::Error::custom(format!(
                "invalid option letter: {:?}",
                s
            ))),
        }
    }
}

/// The option a student marked for a single question.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StudentAnswer {
    Marked(OptionLetter),
    NoAnswer,
}

impl StudentAnswer {
    pub fn letter(&self) -> Option<OptionLetter> {
        match self {
            StudentAnswer::Marked(letter) => Some(*letter),
            StudentAnswer::NoAnswer => None,
        }
    }
}

impl From<Option<OptionLetter>> for StudentAnswer {
    fn from(letter: Option<OptionLetter>) -> Self {
        match letter {
            Some(letter) => StudentAnswer::Marked(letter),
            None => StudentAnswer::NoAnswer,
        }
    }
}

impl Display for StudentAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudentAnswer::Marked(letter) => write!(f, "{}", letter),
            StudentAnswer::NoAnswer => write!(f, "{}", NO_ANSWER_MARKER),
        }
    }
}

impl Serialize for StudentAnswer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for StudentAnswer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == NO_ANSWER_MARKER {
            return Ok(StudentAnswer::NoAnswer);
        }
        let mut chars = s.chars();
        match (chars.next().and_then(OptionLetter::from_char), chars.next()) {
            (Some(letter), None) => Ok(StudentAnswer::Marked(letter)),
            _ => Err(serde::de::Error::custom(format!(
                "invalid student answer: {:?}",
                s
            ))),
        }
    }
}
