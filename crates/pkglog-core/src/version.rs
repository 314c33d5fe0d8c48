//! Distribution version ordering.
//!
//! Versions are compared the way rpm and alpm do it:
//!
//! 1. An optional numeric `epoch:` prefix is compared first (missing = 0)
//! 2. The remainder is split into alternating numeric and alphabetic runs;
//!    every other character separates runs
//! 3. Numeric runs compare by value and beat alphabetic runs
//! 4. `~` sorts before anything, so `1.0~rc1` is older than `1.0`
//! 5. When one side runs out of runs first it is the older one

use std::cmp::Ordering;

use crate::action::ActionKind;

/// Compares two version strings.
///
/// Returns `None` when either version has no alphanumeric content, in which
/// case the ordering is unknown.
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    if a == b {
        return Some(Ordering::Equal);
    }

    if !has_alphanumeric(a) || !has_alphanumeric(b) {
        return None;
    }

    let (epoch_a, rest_a) = split_epoch(a);
    let (epoch_b, rest_b) = split_epoch(b);

    Some(epoch_a.cmp(&epoch_b).then_with(|| compare_segments(rest_a, rest_b)))
}

/// Classifies a version change between an old and a new version.
///
/// Equal versions are a reinstall, a newer version is an upgrade and an older
/// one a downgrade. An unknown ordering counts as an upgrade.
pub fn classify_change(old: &str, new: &str) -> ActionKind {
    match compare_versions(new, old) {
        Some(Ordering::Equal) => ActionKind::Reinstalled,
        Some(Ordering::Less) => ActionKind::Downgraded,
        Some(Ordering::Greater) | None => ActionKind::Upgraded,
    }
}

fn has_alphanumeric(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_alphanumeric())
}

/// Splits a leading `epoch:` off the version.
fn split_epoch(version: &str) -> (u64, &str) {
    if let Some((epoch, rest)) = version.split_once(':') {
        if !epoch.is_empty() && epoch.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(epoch) = epoch.parse() {
                return (epoch, rest);
            }
        }
    }
    (0, version)
}

fn is_separator(b: u8) -> bool {
    !b.is_ascii_alphanumeric() && b != b'~'
}

/// Splits off the longest prefix whose bytes satisfy `pred`.
fn take_run(s: &[u8], pred: impl Fn(u8) -> bool) -> (&[u8], &[u8]) {
    let end = s.iter().position(|&b| !pred(b)).unwrap_or(s.len());
    s.split_at(end)
}

fn compare_numeric(a: &[u8], b: &[u8]) -> Ordering {
    fn trim(s: &[u8]) -> &[u8] {
        let start = s.iter().position(|&b| b != b'0').unwrap_or(s.len());
        &s[start..]
    }

    let (a, b) = (trim(a), trim(b));
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_segments(a: &str, b: &str) -> Ordering {
    let mut one = a.as_bytes();
    let mut two = b.as_bytes();

    loop {
        one = take_run(one, is_separator).1;
        two = take_run(two, is_separator).1;

        match (one.first(), two.first()) {
            (Some(b'~'), Some(b'~')) => {
                one = &one[1..];
                two = &two[1..];
                continue;
            }
            (Some(b'~'), _) => return Ordering::Less,
            (_, Some(b'~')) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(_), Some(_)) => {}
        }

        let numeric = one[0].is_ascii_digit();
        let pred = |b: u8| {
            if numeric {
                b.is_ascii_digit()
            } else {
                b.is_ascii_alphabetic()
            }
        };

        let (seg_one, rest_one) = take_run(one, pred);
        let (seg_two, rest_two) = take_run(two, pred);

        // Segment types differ: numeric is newer than alphabetic
        if seg_two.is_empty() {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ordering = if numeric {
            compare_numeric(seg_one, seg_two)
        } else {
            seg_one.cmp(seg_two)
        };
        if ordering != Ordering::Equal {
            return ordering;
        }

        one = rest_one;
        two = rest_two;
    }
}
