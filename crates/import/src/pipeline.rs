use chrono::{NaiveDateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

use extrato_core::NormalizedTransaction;

use crate::assemble::{RecordAssembler, SkipReason};
use crate::diagnostics::ImportDiagnostics;
use crate::fingerprint;
use crate::institution::{self, InstitutionProfile};
use crate::ofx;
use crate::repair::RepairEngine;

/// Caller-provided dedup scope: every fingerprint already persisted for the
/// target ledger. Concurrent submissions are the caller's problem; the
/// check-then-insert on its side must be atomic.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    pub existing_fingerprints: HashSet<String>,
}

/// Result of one import call. When `already_imported` is set the transaction
/// list is empty and nothing may be persisted.
#[derive(Debug, Clone)]
pub struct StatementImport {
    pub transactions: Vec<NormalizedTransaction>,
    pub fingerprint: String,
    pub already_imported: bool,
    pub diagnostics: ImportDiagnostics,
}

/// Parse one statement export end to end: classify, repair, extract,
/// assemble, dedup. Never fails: malformed input degrades to an empty or
/// shorter list plus diagnostics.
pub fn parse_statement(raw_text: &str, scope: &ImportScope) -> StatementImport {
    parse_statement_at(raw_text, scope, Utc::now().naive_utc())
}

/// [`parse_statement`] with the fallback clock injected. `now` stands in for
/// unparseable posted dates; capturing it once per call keeps the output
/// deterministic for a fixed clock.
pub fn parse_statement_at(
    raw_text: &str,
    scope: &ImportScope,
    now: NaiveDateTime,
) -> StatementImport {
    let detected = institution::classify(raw_text);
    let profile = InstitutionProfile::for_institution(detected);

    let repaired = RepairEngine::new(profile.clone()).repair(raw_text);

    let header = ofx::extract_header(&repaired);
    let fingerprint = fingerprint::file_fingerprint(&header, &repaired);
    let mut diagnostics = ImportDiagnostics::for_institution(detected);

    if fingerprint::already_imported(&fingerprint, &scope.existing_fingerprints) {
        debug!(%fingerprint, "statement already imported, rejecting whole file");
        return StatementImport {
            transactions: Vec::new(),
            fingerprint,
            already_imported: true,
            diagnostics,
        };
    }

    let blocks = ofx::extract_blocks(&repaired);
    if blocks.is_empty() {
        warn!("statement contains no extractable transaction blocks");
    } else {
        debug!(blocks = blocks.len(), institution = %detected, "extracted transaction blocks");
    }

    let assembler = RecordAssembler::new(detected, &profile);
    let mut transactions = Vec::with_capacity(blocks.len());
    for fields in &blocks {
        match assembler.assemble(fields, now) {
            Ok(record) => {
                if record.date_fallback {
                    diagnostics.date_fallback();
                }
                diagnostics.record(&record.transaction);
                transactions.push(record.transaction);
            }
            Err(SkipReason::MissingFields) => diagnostics.skip_missing_fields(),
            Err(SkipReason::BadAmount) => diagnostics.skip_bad_amount(),
        }
    }

    debug_assert!(diagnostics.is_conserved(transactions.len()));

    StatementImport {
        transactions,
        fingerprint,
        already_imported: false,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use extrato_core::{Direction, Institution};

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn run(raw: &str) -> StatementImport {
        parse_statement_at(raw, &ImportScope::default(), fixed_now())
    }

    const SAMPLE: &str = "\
OFXHEADER:100
DATA:OFXSGML
VERSION:102

<OFX>
<SIGNONMSGSRSV1>
<SONRS>
<FI><ORG>BANCO ITAU S.A.<FID>341</FI>
</SONRS>
</SIGNONMSGSRSV1>
<BANKMSGSRSV1>
<STMTTRNRS>
<STMTRS>
<CURDEF>BRL
<BANKACCTFROM>
<BANKID>0341
<ACCTID>00123-4
</BANKACCTFROM>
<BANKTRANLIST>
<DTSTART>20240301
<DTEND>20240331
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20240315
<TRNAMT>-150.00
<FITID>T1
<MEMO>Cobran.a Servi.o
</STMTTRN>
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20240320
<TRNAMT>200.50
<FITID>T2
<NAME>Jose Leitao
<MEMO>
</STMTTRN>
</BANKTRANLIST>
</STMTRS>
</STMTTRNRS>
</BANKMSGSRSV1>
</OFX>
";

    #[test]
    fn full_statement_import() {
        let result = run(SAMPLE);

        assert!(!result.already_imported);
        assert_eq!(result.fingerprint, "0341:00123-4:20240331");
        assert_eq!(result.transactions.len(), 2);
        assert_eq!(result.diagnostics.detected_institution, Institution::Itau);
        assert_eq!(result.diagnostics.total, 2);
        assert_eq!(result.diagnostics.credits, 1);
        assert_eq!(result.diagnostics.debits, 1);
        assert_eq!(result.diagnostics.date_fallback_count, 0);
    }

    #[test]
    fn repaired_memo_lands_in_description() {
        // The punctured accents in the memo repair before extraction.
        let result = run(SAMPLE);
        let t1 = &result.transactions[0];
        assert_eq!(t1.external_id, "T1");
        assert_eq!(t1.amount.to_cents(), 15000);
        assert_eq!(t1.direction, Direction::Debit);
        assert!(t1.description.contains("Cobranca Servico"));
        assert_eq!(
            t1.posted_at.date(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn empty_memo_resolves_to_name() {
        let result = run(SAMPLE);
        let t2 = &result.transactions[1];
        assert_eq!(t2.description, "Jose Leitao");
        assert_eq!(t2.direction, Direction::Credit);
        assert_eq!(t2.amount.to_cents(), 20050);
    }

    #[test]
    fn order_matches_source_blocks() {
        let result = run(SAMPLE);
        let ids: Vec<&str> = result
            .transactions
            .iter()
            .map(|t| t.external_id.as_str())
            .collect();
        assert_eq!(ids, ["T1", "T2"]);
    }

    #[test]
    fn already_imported_short_circuits() {
        let first = run(SAMPLE);
        let scope = ImportScope {
            existing_fingerprints: HashSet::from([first.fingerprint.clone()]),
        };
        let second = parse_statement_at(SAMPLE, &scope, fixed_now());

        assert!(second.already_imported);
        assert!(second.transactions.is_empty());
        assert_eq!(second.fingerprint, first.fingerprint);
        assert_eq!(second.diagnostics.total, 0);
    }

    #[test]
    fn deterministic_for_fixed_clock() {
        let a = run(SAMPLE);
        let b = run(SAMPLE);
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.transactions, b.transactions);
    }

    #[test]
    fn zero_blocks_is_empty_success() {
        let result = run("<OFX><BANKTRANLIST><DTSTART>20240301</BANKTRANLIST></OFX>");
        assert!(!result.already_imported);
        assert!(result.transactions.is_empty());
        assert_eq!(result.diagnostics.total, 0);
    }

    #[test]
    fn unparseable_date_keeps_record_with_fallback() {
        let doc = "\
<OFX><BANKACCTFROM><BANKID>341<ACCTID>9</BANKACCTFROM>
<BANKTRANLIST><DTEND>20240331
<STMTTRN>
<DTPOSTED>ABCDEFGH
<TRNAMT>-10.00
<FITID>T1
</STMTTRN>
</BANKTRANLIST></OFX>
";
        let result = run(doc);
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.transactions[0].posted_at, fixed_now());
        assert_eq!(result.diagnostics.date_fallback_count, 1);
        assert_eq!(result.diagnostics.date_range.unwrap().start, fixed_now());
    }

    #[test]
    fn count_conservation_with_skips() {
        let doc = "\
<OFX><BANKTRANLIST>
<STMTTRN>
<DTPOSTED>20240301
<TRNAMT>-10.00
<FITID>OK1
</STMTTRN>
<STMTTRN>
<DTPOSTED>20240302
<TRNAMT>12.00
</STMTTRN>
<STMTTRN>
<DTPOSTED>20240303
<TRNAMT>banana
<FITID>BAD1
</STMTTRN>
</BANKTRANLIST></OFX>
";
        let result = run(doc);
        assert_eq!(result.transactions.len(), 1);
        assert_eq!(result.diagnostics.skipped_missing_fields, 1);
        assert_eq!(result.diagnostics.skipped_bad_amount, 1);
        assert_eq!(result.diagnostics.total, 3);
        assert!(result
            .diagnostics
            .is_conserved(result.transactions.len()));
    }

    #[test]
    fn headerless_document_uses_content_hash_fingerprint() {
        let doc = "<STMTTRN>\n<FITID>T1\n<TRNAMT>1.00\n<DTPOSTED>20240301\n</STMTTRN>\n";
        let result = run(doc);
        assert_eq!(result.fingerprint.len(), 64);
        // Same content, same fingerprint; different content, different one.
        assert_eq!(result.fingerprint, run(doc).fingerprint);
        let other = "<STMTTRN>\n<FITID>T2\n<TRNAMT>1.00\n<DTPOSTED>20240301\n</STMTTRN>\n";
        assert_ne!(result.fingerprint, run(other).fingerprint);
    }

    #[test]
    fn sign_invariant_holds_for_all_outputs() {
        let result = run(SAMPLE);
        for tx in &result.transactions {
            assert!(!tx.amount.is_negative());
            match tx.direction {
                Direction::Credit => assert!(tx.signed_amount() > rust_decimal::Decimal::ZERO),
                Direction::Debit => assert!(tx.signed_amount() <= rust_decimal::Decimal::ZERO),
            }
        }
    }

    #[test]
    fn institution_abbreviations_expand_in_descriptions() {
        let doc = "\
<OFX><ORG>BANCO ITAU S.A.
<BANKTRANLIST><DTEND>20240331
<STMTTRN>
<DTPOSTED>20240310
<TRNAMT>-300.00
<FITID>T1
<MEMO>TBI 44712-9
</STMTTRN>
</BANKTRANLIST></OFX>
";
        let result = run(doc);
        assert_eq!(result.diagnostics.detected_institution, Institution::Itau);
        assert_eq!(
            result.transactions[0].description,
            "TRANSFERENCIA BANCARIA 44712-9"
        );
    }
}
