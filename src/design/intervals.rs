//! Half-open interval arithmetic on `[0, 1)`.
//!
//! Interval lists are `(start, end)` pairs kept sorted and disjoint.

/// Pieces shorter than this are treated as empty.
pub(crate) const EPS: f64 = 1e-12;

/// Sorts and merges touching or overlapping intervals, dropping slivers.
pub(crate) fn normalize(intervals: &mut Vec<(f64, f64)>) {
    intervals.retain(|&(s, e)| e - s > EPS);
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(intervals.len());
    for &(s, e) in intervals.iter() {
        match merged.last_mut() {
            Some(last) if s <= last.1 + EPS => last.1 = last.1.max(e),
            _ => merged.push((s, e)),
        }
    }
    *intervals = merged;
}

/// Total length of a normalized list.
pub(crate) fn total(intervals: &[(f64, f64)]) -> f64 {
    intervals.iter().map(|(s, e)| e - s).sum()
}

/// Parts of `[start, end)` not covered by the normalized list `covered`.
pub(crate) fn subtract(start: f64, end: f64, covered: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    let mut cursor = start;
    for &(s, e) in covered {
        if e <= cursor {
            continue;
        }
        if s >= end {
            break;
        }
        if s > cursor + EPS {
            out.push((cursor, s.min(end)));
        }
        cursor = cursor.max(e);
        if cursor >= end {
            break;
        }
    }
    if end - cursor > EPS {
        out.push((cursor, end));
    }
    out
}
