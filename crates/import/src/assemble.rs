use chrono::NaiveDateTime;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use extrato_core::{Direction, Institution, Money, NormalizedTransaction};

use crate::date;
use crate::institution::{DescriptionStyle, InstitutionProfile};
use crate::ofx::RawRecordFields;

/// Why a block produced no transaction. Skips are counted, never surfaced per
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Missing identifier or amount; such records are dropped, never
    /// defaulted.
    MissingFields,
    /// Amount field present but not a parseable signed decimal.
    BadAmount,
}

#[derive(Debug, Clone)]
pub struct AssembledRecord {
    pub transaction: NormalizedTransaction,
    /// The posted date was unparseable and the pipeline clock stood in.
    pub date_fallback: bool,
}

/// Builds normalized transactions from repaired block fields.
pub struct RecordAssembler {
    institution: Institution,
    style: DescriptionStyle,
    whitespace: Regex,
}

impl RecordAssembler {
    pub fn new(institution: Institution, profile: &InstitutionProfile) -> Self {
        RecordAssembler {
            institution,
            style: profile.description_style,
            whitespace: Regex::new(r"\s+").expect("whitespace class is a valid pattern"),
        }
    }

    /// `fallback_now` stands in for unparseable posted dates; it is captured
    /// once per import call so every fallback in a file agrees.
    pub fn assemble(
        &self,
        fields: &RawRecordFields,
        fallback_now: NaiveDateTime,
    ) -> Result<AssembledRecord, SkipReason> {
        let external_id = fields
            .fit_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(SkipReason::MissingFields)?;
        let raw_amount = fields.amount.as_deref().ok_or(SkipReason::MissingFields)?;
        let signed = parse_amount(raw_amount).ok_or(SkipReason::BadAmount)?;

        let (posted_at, date_fallback) = match fields.posted.as_deref().and_then(date::normalize) {
            Some(ts) => (ts, false),
            None => {
                debug!(
                    external_id,
                    raw = fields.posted.as_deref().unwrap_or(""),
                    "unparseable posted date, substituting import time"
                );
                (fallback_now, true)
            }
        };

        let transaction = NormalizedTransaction {
            external_id: external_id.to_string(),
            posted_at,
            amount: Money::from_decimal(signed.abs()),
            direction: Direction::from_signed(signed),
            description: self.describe(fields),
            raw_type: fields.trn_type.clone(),
            source_institution: self.institution,
        }
        .validated()
        .map_err(|_| SkipReason::MissingFields)?;

        Ok(AssembledRecord {
            transaction,
            date_fallback,
        })
    }

    /// Institution-aware MEMO/NAME merge, then whitespace collapse, trim, and
    /// a final non-ASCII sweep (repair already transliterated the accents
    /// worth keeping).
    fn describe(&self, fields: &RawRecordFields) -> String {
        let memo = fields.memo.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let name = fields.name.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let merged = match (self.style, name, memo) {
            (DescriptionStyle::NamePrimary, Some(name), Some(_)) => name.to_string(),
            (_, Some(name), Some(memo)) if name != memo => format!("{name} - {memo}"),
            (_, _, Some(memo)) => memo.to_string(),
            (_, Some(name), None) => name.to_string(),
            (_, None, None) => match fields.check_number.as_deref() {
                // Compensated-check rows often carry nothing but the number.
                Some(check) => format!("Cheque {check}"),
                None => String::new(),
            },
        };

        let collapsed = self.whitespace.replace_all(&merged, " ");
        collapsed
            .trim()
            .chars()
            .filter(|c| c.is_ascii() && !c.is_ascii_control())
            .collect()
    }
}

/// Signed decimal from the shapes statements actually carry: `-150.00`,
/// `1.234,56`, `R$ 200,50`, `(75.25)`. A lone comma is the Brazilian decimal
/// separator; with both separators present, the rightmost wins as the decimal
/// point.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (parenthesized, s) = match s.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };

    let mut cleaned = s.replace("R$", "").replace(['$', ' '], "");
    match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => {
            cleaned = cleaned.replace('.', "").replace(',', ".");
        }
        (Some(_), Some(_)) => {
            cleaned = cleaned.replace(',', "");
        }
        (None, Some(_)) => {
            cleaned = cleaned.replace(',', ".");
        }
        _ => {}
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    Some(if parenthesized { -value } else { value })
}
