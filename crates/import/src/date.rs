use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Shapes accepted after the fixed-width OFX form fails.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Parse a posted-date value into a timestamp.
///
/// Tried in order: strip a trailing bracketed timezone annotation
/// (`20240315120000[-3:BRT]`), fixed-width `YYYYMMDD` with optional `HHMMSS`,
/// then the generic fallbacks. Returns `None` when nothing fits; the
/// pipeline substitutes its per-call clock and counts the fallback, keeping a
/// visibly-approximate record instead of dropping it.
pub fn normalize(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let s = match s.find('[') {
        Some(at) => s[..at].trim_end(),
        None => s,
    };

    if let Some(ts) = parse_fixed_width(s) {
        return Some(ts);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// `YYYYMMDD` with an optional `HHMMSS` tail. An invalid time-of-day degrades
/// to midnight rather than losing the date.
fn parse_fixed_width(s: &str) -> Option<NaiveDateTime> {
    let bytes = s.as_bytes();
    if bytes.len() < 8 || !bytes[..8].iter().all(u8::is_ascii_digit) {
        return None;
    }

    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let tail = &s[8..];
    if tail.len() >= 6 && tail.as_bytes()[..6].iter().all(u8::is_ascii_digit) {
        let hour: u32 = tail[0..2].parse().ok()?;
        let minute: u32 = tail[2..4].parse().ok()?;
        let second: u32 = tail[4..6].parse().ok()?;
        if let Some(ts) = date.and_hms_opt(hour, minute, second) {
            return Some(ts);
        }
    }

    date.and_hms_opt(0, 0, 0)
}
