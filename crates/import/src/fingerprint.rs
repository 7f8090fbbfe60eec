use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::ofx::StatementHeader;

/// Whole-file identity: bank id, account id, and statement reference date,
/// `:`-joined in that order. Empty components hold their position so the
/// shape stays stable across institutions. A headerless document falls back
/// to a content hash (a uniqueness goal, not a security property).
pub fn file_fingerprint(header: &StatementHeader, repaired_text: &str) -> String {
    let bank = header.bank_id.as_deref().unwrap_or("").trim();
    let account = header.account_id.as_deref().unwrap_or("").trim();
    let reference = header.end_date.as_deref().map(date_part).unwrap_or("");

    if bank.is_empty() && account.is_empty() && reference.is_empty() {
        return sha256_hex(repaired_text.as_bytes());
    }
    format!("{bank}:{account}:{reference}")
}

/// First eight digits of a DTEND value: the date without time-of-day or
/// timezone annotation, so a re-export of the same period still matches.
fn date_part(raw: &str) -> &str {
    let raw = raw.trim();
    let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
    if digits >= 8 {
        &raw[..8]
    } else {
        raw
    }
}

/// Compute SHA-256 of a byte slice as a lowercase hex string (64 chars).
fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

/// Whole-file dedup check against the caller-injected scope. Stateless: the
/// atomic check-then-insert lives at the caller's persistence boundary.
pub fn already_imported(fingerprint: &str, existing: &HashSet<String>) -> bool {
    existing.contains(fingerprint)
}
