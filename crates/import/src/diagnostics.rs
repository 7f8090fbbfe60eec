use serde::{Deserialize, Serialize};

use extrato_core::{DateRange, Direction, Institution, NormalizedTransaction};

/// Write-once import summary returned alongside the transaction list.
///
/// `total` counts extracted records, so it always equals emitted transactions
/// plus the two skip counters. `date_fallback_count` is part of the public
/// contract: a nonzero value means some posted dates are approximate and the
/// user should see that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportDiagnostics {
    pub total: usize,
    pub credits: usize,
    pub debits: usize,
    pub skipped_missing_fields: usize,
    pub skipped_bad_amount: usize,
    pub date_fallback_count: usize,
    pub date_range: Option<DateRange>,
    pub detected_institution: Institution,
}

impl ImportDiagnostics {
    pub fn for_institution(institution: Institution) -> Self {
        ImportDiagnostics {
            detected_institution: institution,
            ..Default::default()
        }
    }

    pub fn record(&mut self, tx: &NormalizedTransaction) {
        self.total += 1;
        match tx.direction {
            Direction::Credit => self.credits += 1,
            Direction::Debit => self.debits += 1,
        }
        match &mut self.date_range {
            Some(range) => range.expand(tx.posted_at),
            None => self.date_range = Some(DateRange::single(tx.posted_at)),
        }
    }

    pub fn skip_missing_fields(&mut self) {
        self.total += 1;
        self.skipped_missing_fields += 1;
    }

    pub fn skip_bad_amount(&mut self) {
        self.total += 1;
        self.skipped_bad_amount += 1;
    }

    pub fn date_fallback(&mut self) {
        self.date_fallback_count += 1;
    }

    /// Count conservation: every extracted record is either emitted or
    /// counted under exactly one skip reason.
    pub fn is_conserved(&self, emitted: usize) -> bool {
        self.total == emitted + self.skipped_missing_fields + self.skipped_bad_amount
    }
}
