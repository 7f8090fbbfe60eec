//! Tag-level scanner for OFX/SGML statement exports.
//!
//! Exports are a flat soup of `<TAG>value` lines with `<STMTTRN>` blocks for
//! transactions. The scanner never errors on malformed input: broken blocks
//! yield fewer records, never partial ones.

use tracing::debug;

/// Raw field values for one transaction block. A missing tag is `None`;
/// absence is data, not failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecordFields {
    pub fit_id: Option<String>,
    pub posted: Option<String>,
    pub amount: Option<String>,
    pub trn_type: Option<String>,
    pub memo: Option<String>,
    pub name: Option<String>,
    pub check_number: Option<String>,
    pub ref_number: Option<String>,
}

/// Document-level identity tags, used by the classifier fallback and the file
/// fingerprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementHeader {
    pub bank_id: Option<String>,
    pub account_id: Option<String>,
    pub org: Option<String>,
    pub fid: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

const BLOCK_OPEN: &str = "<STMTTRN>";
const BLOCK_CLOSE: &str = "</STMTTRN>";

/// Value of the first `<TAG>` occurrence: text after the closing `>` up to the
/// next `<` or end of line, trimmed. Empty values collapse to `None`.
///
/// Tag search is ASCII-case-insensitive; the uppercase fold preserves byte
/// offsets, so slices index the original text.
pub fn tag_value(text: &str, tag: &str) -> Option<String> {
    let upper = text.to_ascii_uppercase();
    let marker = format!("<{}>", tag.to_ascii_uppercase());
    let at = upper.find(&marker)?;
    let rest = &text[at + marker.len()..];
    let end = rest.find(['<', '\r', '\n']).unwrap_or(rest.len());
    let value = rest[..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn extract_header(text: &str) -> StatementHeader {
    StatementHeader {
        bank_id: tag_value(text, "BANKID"),
        account_id: tag_value(text, "ACCTID"),
        org: tag_value(text, "ORG"),
        fid: tag_value(text, "FID"),
        start_date: tag_value(text, "DTSTART"),
        end_date: tag_value(text, "DTEND"),
    }
}

/// Sequential, non-overlapping scan for block delimiter pairs, preserving
/// document order. An unterminated block drops the remainder of the document;
/// a block carrying neither identifier nor amount is noise and is not
/// extracted at all.
pub fn extract_blocks(text: &str) -> Vec<RawRecordFields> {
    let upper = text.to_ascii_uppercase();
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(open) = find_from(&upper, BLOCK_OPEN, cursor) {
        let body_start = open + BLOCK_OPEN.len();
        let Some(close) = find_from(&upper, BLOCK_CLOSE, body_start) else {
            debug!(offset = open, "unterminated transaction block, dropping remainder");
            break;
        };

        let body = &text[body_start..close];
        let fields = RawRecordFields {
            fit_id: tag_value(body, "FITID"),
            posted: tag_value(body, "DTPOSTED"),
            amount: tag_value(body, "TRNAMT"),
            trn_type: tag_value(body, "TRNTYPE"),
            memo: tag_value(body, "MEMO"),
            name: tag_value(body, "NAME"),
            check_number: tag_value(body, "CHECKNUM"),
            ref_number: tag_value(body, "REFNUM"),
        };
        if fields.fit_id.is_some() || fields.amount.is_some() {
            blocks.push(fields);
        }

        cursor = close + BLOCK_CLOSE.len();
    }

    blocks
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack[from..].find(needle).map(|i| from + i)
}
