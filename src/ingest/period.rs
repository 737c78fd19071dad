//! Period-code parsing.
//!
//! Survey extracts encode the moving quarter in one of two notations:
//!
//! - Notation A: `"2010 ene-mar"`: year plus a Spanish three-letter month
//!   window; the first month decides the quarter.
//! - Notation B: `"2024-V04"`: year plus a rolling release index.
//!
//! Any other format yields `None` plus a logged warning; the caller keeps
//! the record with null temporal fields and moves on.

use chrono::NaiveDate;

use crate::domain::Period;

/// Canonical first month of each calendar quarter (Q1→Jan … Q4→Oct).
pub fn quarter_start_month(quarter: u8) -> Option<u32> {
    match quarter {
        1 => Some(1),
        2 => Some(4),
        3 => Some(7),
        4 => Some(10),
        _ => None,
    }
}

/// Display name of a calendar quarter, in the survey's own convention.
pub fn quarter_name(quarter: u8) -> Option<&'static str> {
    match quarter {
        1 => Some("ene-mar"),
        2 => Some("abr-jun"),
        3 => Some("jul-sep"),
        4 => Some("oct-dic"),
        _ => None,
    }
}

fn month_number(abbrev: &str) -> Option<u32> {
    let m = match abbrev.to_ascii_lowercase().as_str() {
        "ene" => 1,
        "feb" => 2,
        "mar" => 3,
        "abr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "ago" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dic" => 12,
        _ => return None,
    };
    Some(m)
}

/// Parse a period code in either notation.
///
/// Returns `None` (after logging) on anything unparseable; no error ever
/// escapes to the caller.
pub fn parse_period(code: &str) -> Option<Period> {
    let code = code.trim();
    let parsed = parse_notation_a(code).or_else(|| parse_notation_b(code));
    if parsed.is_none() {
        log::warn!("unrecognized period code format: {code:?}");
    }
    parsed
}

/// Notation A: `"<year> <mon>-<mon>"` with Spanish month abbreviations.
fn parse_notation_a(code: &str) -> Option<Period> {
    let (year_str, window) = code.split_once(' ')?;
    let year: i32 = parse_year(year_str)?;

    let (start, end) = window.trim().split_once('-')?;
    let month_start = month_number(start.trim())?;
    // The end month only confirms the shape of the window.
    month_number(end.trim())?;

    let quarter = ((month_start - 1) / 3 + 1) as u8;
    build_period(year, quarter, month_start)
}

/// Notation B: `"<year>-V<index>"` with a rolling release index.
fn parse_notation_b(code: &str) -> Option<Period> {
    let (year_str, tail) = code.split_once("-V")?;
    let year: i32 = parse_year(year_str)?;

    if tail.len() != 2 || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: u32 = tail.parse().ok()?;
    // Indices run 1..=12 in the published vocabulary; anything else is
    // treated as unparseable rather than extrapolated.
    if index == 0 || index > 12 {
        return None;
    }

    // Carried-over quirk from the source vocabulary: the quarter treats the
    // index as a quarter counter, while month_start treats the same index as
    // a month counter (mod 12). For index > 4 the two can disagree about
    // which part of the year the code points at. Reproduced as documented,
    // not fixed.
    let quarter = (((index - 1) / 3) + 1) as u8;
    let month_start = ((index - 1) % 12) + 1;
    build_period(year, quarter, month_start)
}

fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn build_period(year: i32, quarter: u8, month_start: u32) -> Option<Period> {
    let approx_date = NaiveDate::from_ymd_opt(year, month_start, 1)?;
    Some(Period {
        year,
        quarter,
        month_start,
        approx_date,
    })
}
