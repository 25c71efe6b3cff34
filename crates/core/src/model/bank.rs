use rand::Rng;
use thiserror::Error;

use crate::model::reaction::ReactionRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank has no records")]
    Empty,
}

/// Ordered, immutable collection of reactions loaded at startup.
///
/// Records have no identity beyond their position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    records: Vec<ReactionRecord>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(records: Vec<ReactionRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[ReactionRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ReactionRecord> {
        self.records.get(index)
    }

    /// Pick a position uniformly at random. Consecutive picks are independent.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Empty` if the bank has no records.
    pub fn pick_random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize, BankError> {
        if self.records.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(rng.random_range(0..self.records.len()))
    }

    /// Pick a record uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Empty` if the bank has no records.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&ReactionRecord, BankError> {
        let index = self.pick_random_index(rng)?;
        self.records.get(index).ok_or(BankError::Empty)
    }
}

impl From<Vec<ReactionRecord>> for QuestionBank {
    fn from(records: Vec<ReactionRecord>) -> Self {
        Self::new(records)
    }
}
