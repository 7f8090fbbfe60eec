use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::institution::Institution;
use super::money::Money;

/// Whether a transaction increases (credit) or decreases (debit) the account
/// balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    /// Derived from the sign of the raw statement amount: strictly positive is
    /// a credit, zero and negative are debits.
    pub fn from_signed(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Direction::Credit
        } else {
            Direction::Debit
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Credit => write!(f, "CREDIT"),
            Direction::Debit => write!(f, "DEBIT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("transaction is missing an external identifier")]
    MissingExternalId,
    #[error("transaction amount must not be negative: {0}")]
    NegativeAmount(Money),
}

/// Ledger-ready transaction produced by the import pipeline.
///
/// `amount` is a magnitude; the original sign lives in `direction`. Records
/// without an identifier or amount never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub external_id: String,
    pub posted_at: NaiveDateTime,
    pub amount: Money,
    pub direction: Direction,
    pub description: String,
    pub raw_type: Option<String>,
    pub source_institution: Institution,
}

impl NormalizedTransaction {
    /// Checks the record invariants: non-empty external id, non-negative
    /// amount.
    pub fn validated(self) -> Result<Self, RecordError> {
        if self.external_id.trim().is_empty() {
            return Err(RecordError::MissingExternalId);
        }
        if self.amount.is_negative() {
            return Err(RecordError::NegativeAmount(self.amount));
        }
        Ok(self)
    }

    /// The amount as the statement originally carried it: credits positive,
    /// debits negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Credit => self.amount.as_decimal(),
            Direction::Debit => -self.amount.as_decimal(),
        }
    }
}
