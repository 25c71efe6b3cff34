//! Grading of a submitted answer against the active reaction.
//!
//! Each of the three fields is compared after trimming and lowercasing both
//! sides. The number of matches maps to points through a fixed step table
//! that rewards a full match well above partial ones.

use crate::model::{CorrectCount, ReactionRecord};

/// Points awarded per correct field count, indexed by the count.
pub const POINTS_TABLE: [u32; 4] = [0, 10, 20, 30];

/// Trim surrounding whitespace and lowercase.
#[must_use]
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[must_use]
pub fn points_for(correct: CorrectCount) -> u32 {
    POINTS_TABLE[usize::from(correct.value())]
}

/// The player's free-text answer for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSheet<'a> {
    pub products: &'a str,
    pub reaction_type: &'a str,
    pub conditions: &'a str,
}

impl<'a> AnswerSheet<'a> {
    #[must_use]
    pub fn new(products: &'a str, reaction_type: &'a str, conditions: &'a str) -> Self {
        Self {
            products,
            reaction_type,
            conditions,
        }
    }
}

/// Per-field match flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatches {
    pub products: bool,
    pub reaction_type: bool,
    pub conditions: bool,
}

/// Outcome of grading one answer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub matches: FieldMatches,
    pub correct_count: CorrectCount,
    pub points: u32,
}

#[must_use]
pub fn grade(record: &ReactionRecord, answer: &AnswerSheet<'_>) -> Grade {
    let matches = FieldMatches {
        products: normalize(answer.products) == normalize(record.products()),
        reaction_type: normalize(answer.reaction_type) == normalize(record.reaction_type()),
        conditions: normalize(answer.conditions) == normalize(record.conditions()),
    };
    let correct_count =
        CorrectCount::from_matches([matches.products, matches.reaction_type, matches.conditions]);

    Grade {
        matches,
        correct_count,
        points: points_for(correct_count),
    }
}
