//! Key comparison for every sort mode.
//!
//! Each mode comparator is a total preorder on keys. Keys that do not fit a
//! typed mode are never an error: numeric and human-numeric modes push them
//! after every number, month mode puts them before every month, and among
//! themselves they fall back to plain text order.

use crate::config::{KeyMode, SortConfig};
use crate::key::extract_key;
use std::cmp::Ordering;

/// Byte-wise comparison of two keys.
#[inline]
pub fn compare_lexical(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Parse a numeric key after trimming surrounding whitespace.
/// NaN is treated as "not a number" so it cannot break the ordering.
pub fn parse_numeric(key: &str) -> Option<f64> {
    key.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Shared ordering for the two numeric modes.
fn compare_parsed(a: Option<f64>, b: Option<f64>, a_key: &str, b_key: &str) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_lexical(a_key, b_key),
    }
}

/// Numeric sort (-n).
pub fn compare_numeric(a: &str, b: &str) -> Ordering {
    compare_parsed(parse_numeric(a), parse_numeric(b), a, b)
}

fn magnitude_exponent(letter: u8) -> Option<i32> {
    match letter {
        b'K' => Some(1),
        b'M' => Some(2),
        b'G' => Some(3),
        b'T' => Some(4),
        b'P' => Some(5),
        b'E' => Some(6),
        b'Z' => Some(7),
        b'Y' => Some(8),
        _ => None,
    }
}

/// Multiplier for a magnitude suffix. `K`, `KB` scale by 1000; `Ki`, `KiB`
/// scale by 1024. A bare `B` (or no suffix) is 1.
pub fn suffix_multiplier(suffix: &str) -> Option<f64> {
    let upper = suffix.to_ascii_uppercase();
    match upper.as_bytes() {
        [] | [b'B'] => Some(1.0),
        [p] | [p, b'B'] => magnitude_exponent(*p).map(|e| 1000f64.powi(e)),
        [p, b'I'] | [p, b'I', b'B'] => magnitude_exponent(*p).map(|e| 1024f64.powi(e)),
        _ => None,
    }
}

/// Parse a human-readable size such as `512`, `2K`, `1.5GiB`.
pub fn parse_human_numeric(key: &str) -> Option<f64> {
    let trimmed = key.trim();
    if let Some(value) = parse_numeric(trimmed) {
        return Some(value);
    }

    let number = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &trimmed[number.len()..];
    let base = parse_numeric(number)?;
    suffix_multiplier(suffix).map(|m| base * m)
}

/// Human numeric sort (-h).
pub fn compare_human_numeric(a: &str, b: &str) -> Ordering {
    compare_parsed(parse_human_numeric(a), parse_human_numeric(b), a, b)
}

/// Month rank 1-12 from the first three letters, 0 when unrecognized.
pub fn month_rank(key: &str) -> u8 {
    let bytes = key.trim_start().as_bytes();
    if bytes.len() < 3 {
        return 0;
    }
    let m = [
        bytes[0].to_ascii_uppercase(),
        bytes[1].to_ascii_uppercase(),
        bytes[2].to_ascii_uppercase(),
    ];
    match &m {
        b"JAN" => 1,
        b"FEB" => 2,
        b"MAR" => 3,
        b"APR" => 4,
        b"MAY" => 5,
        b"JUN" => 6,
        b"JUL" => 7,
        b"AUG" => 8,
        b"SEP" => 9,
        b"OCT" => 10,
        b"NOV" => 11,
        b"DEC" => 12,
        _ => 0,
    }
}

/// Month sort (-M).
pub fn compare_month(a: &str, b: &str) -> Ordering {
    match (month_rank(a), month_rank(b)) {
        (0, 0) => compare_lexical(a, b),
        (ra, rb) => ra.cmp(&rb),
    }
}

/// Split off the leading run of all-digit or all-non-digit bytes.
fn split_run(s: &[u8]) -> (&[u8], &[u8]) {
    let digits = s[0].is_ascii_digit();
    let end = s
        .iter()
        .position(|b| b.is_ascii_digit() != digits)
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Compare two digit runs by value without overflowing.
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = &a[a.iter().position(|&d| d != b'0').unwrap_or(a.len())..];
    let b = &b[b.iter().position(|&d| d != b'0').unwrap_or(b.len())..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Version sort (-V): `1.2 < 1.10 < 1.11`.
pub fn compare_version(a: &str, b: &str) -> Ordering {
    let mut a = a.as_bytes();
    let mut b = b.as_bytes();

    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        let (run_a, rest_a) = split_run(a);
        let (run_b, rest_b) = split_run(b);

        let cmp = if run_a[0].is_ascii_digit() && run_b[0].is_ascii_digit() {
            compare_digit_runs(run_a, run_b)
        } else {
            run_a.cmp(run_b)
        };
        if cmp != Ordering::Equal {
            return cmp;
        }

        a = rest_a;
        b = rest_b;
    }
}

/// Compare two already-extracted keys under `mode`.
pub fn compare_keys(a: &str, b: &str, mode: KeyMode) -> Ordering {
    match mode {
        KeyMode::Lexicographic => compare_lexical(a, b),
        KeyMode::Numeric => compare_numeric(a, b),
        KeyMode::HumanNumeric => compare_human_numeric(a, b),
        KeyMode::Version => compare_version(a, b),
        KeyMode::Month => compare_month(a, b),
    }
}

/// Apply the reverse modifier.
#[inline]
pub fn directed(cmp: Ordering, reverse: bool) -> Ordering {
    if reverse {
        cmp.reverse()
    } else {
        cmp
    }
}

/// Compare two lines under `config`: extract both keys, compare by mode,
/// then apply reverse. Equal keys compare `Equal`; tie-breaking is the
/// orderer's job.
pub fn compare_lines(a: &str, b: &str, config: &SortConfig) -> Ordering {
    let key_a = extract_key(a, config);
    let key_b = extract_key(b, config);
    directed(compare_keys(&key_a, &key_b, config.mode), config.reverse)
}

/// Strict "a sorts before b".
pub fn less(a: &str, b: &str, config: &SortConfig) -> bool {
    compare_lines(a, b, config) == Ordering::Less
}
