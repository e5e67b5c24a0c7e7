//! The [`Design`] value: a FIP-preserving bar layout.

use super::intervals::{self, EPS};
use super::types::{BarLayout, BarSegment, ColumnBars, Segment, Switch};
use crate::error::{Error, Result};
use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Tolerance on per-unit lengths and on the FIP sum.
pub const TOLERANCE: f64 = 1e-9;

/// Grid used to quantize segment edges for fingerprints.
const FINGERPRINT_SCALE: f64 = 1e9;

/// A geometric sampling design.
///
/// The design has `⌈n⌉` draw-columns, each the interval `[0, 1)`. Unit
/// `i` owns segments whose lengths sum to `π_i`. A sample is drawn by
/// picking one height `u ~ U[0, 1)` and taking every unit that covers
/// `u` in some column, so:
///
/// - segments inside a column never overlap (occupancy ≤ 1),
/// - the segments of one unit never overlap in height across columns,
/// - `π_ij` is the length of the height range both `i` and `j` cover.
///
/// A `Design` is immutable. Columns are reference-counted, so deriving a
/// new design through [`apply_switch`](Self::apply_switch) copies only
/// the column that changes.
///
/// # Examples
///
/// ```
/// use u_sampling::design::Design;
///
/// let design = Design::from_fip(&[0.5, 0.5, 0.5, 0.5]).unwrap();
/// assert_eq!(design.num_columns(), 2);
///
/// let sip = design.sip();
/// assert!((sip[0][0] - 0.5).abs() < 1e-12);
/// assert!((sip[0][2] - 0.5).abs() < 1e-12); // stacked at the same heights
/// assert!(sip[0][1].abs() < 1e-12); // same column, disjoint heights
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    fip: Arc<[f64]>,
    columns: Vec<Arc<[Segment]>>,
}

impl Design {
    /// Builds the canonical sequential layout for `fip`.
    ///
    /// Units are laid end to end on `[0, ⌈n⌉)` in index order; a unit
    /// crossing an integer boundary continues at the bottom of the next
    /// column. Because `π_i ≤ 1`, the two pieces of a split unit never
    /// overlap in height.
    ///
    /// # Errors
    ///
    /// `InvalidInclusionProbabilities` if `fip` is empty or any entry is
    /// outside `(0, 1]` or not finite.
    pub fn from_fip(fip: &[f64]) -> Result<Self> {
        let n = validate_fip(fip)?;
        let num_columns = column_count(n);
        let columns = sequential_layout(fip, num_columns);
        Ok(Self {
            fip: Arc::from(fip),
            columns: columns
                .into_iter()
                .map(|c| Arc::from(normalize_column(c)))
                .collect(),
        })
    }

    /// Like [`from_fip`](Self::from_fip), but also checks `Σπ_i = n`.
    ///
    /// # Errors
    ///
    /// `InvalidInclusionProbabilities` if the sum deviates from
    /// `sample_size` by more than the tolerance.
    pub fn from_fip_with_size(fip: &[f64], sample_size: f64) -> Result<Self> {
        let n = validate_fip(fip)?;
        if !((n - sample_size).abs() <= sum_tolerance(fip.len())) {
            return Err(Error::InvalidInclusionProbabilities(format!(
                "probabilities sum to {n}, expected sample size {sample_size}"
            )));
        }
        Self::from_fip(fip)
    }

    /// Builds a design from explicit columns, checking every invariant.
    ///
    /// Columns are normalized first: slivers are dropped, segments sorted,
    /// and touching pieces of the same unit merged.
    ///
    /// # Errors
    ///
    /// - `InvalidInclusionProbabilities` for a bad `fip`
    /// - `DimensionMismatch` if the column count is not `⌈Σπ⌉`
    /// - `InvalidLayout` if a column overflows, a unit's length differs
    ///   from its `π_i`, or a unit covers some height twice
    pub fn from_columns(fip: &[f64], columns: Vec<Vec<Segment>>) -> Result<Self> {
        validate_fip(fip)?;
        Self::from_parts(Arc::from(fip), columns)
    }

    /// Checked constructor reusing an already validated FIP vector.
    pub(crate) fn from_parts(fip: Arc<[f64]>, columns: Vec<Vec<Segment>>) -> Result<Self> {
        let expected = column_count(fip.iter().sum());
        if columns.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: columns.len(),
            });
        }

        let columns: Vec<Vec<Segment>> = columns.into_iter().map(normalize_column).collect();
        let n_units = fip.len();
        let mut projections: Vec<Vec<(f64, f64)>> = vec![Vec::new(); n_units];
        let mut raw_lengths = vec![0.0; n_units];

        for (c, column) in columns.iter().enumerate() {
            let mut prev_end = 0.0;
            for seg in column {
                if seg.unit >= n_units {
                    return Err(Error::InvalidLayout(format!(
                        "column {c} references unit {} outside population of {n_units}",
                        seg.unit
                    )));
                }
                if !(seg.start >= -EPS && seg.end <= 1.0 + EPS) {
                    return Err(Error::InvalidLayout(format!(
                        "segment [{}, {}) of unit {} leaves column {c}",
                        seg.start, seg.end, seg.unit
                    )));
                }
                if seg.start < prev_end - EPS {
                    return Err(Error::InvalidLayout(format!(
                        "segments overlap in column {c} at height {}",
                        seg.start
                    )));
                }
                prev_end = seg.end;
                raw_lengths[seg.unit] += seg.len();
                projections[seg.unit].push((seg.start, seg.end));
            }
        }

        for (unit, proj) in projections.iter_mut().enumerate() {
            intervals::normalize(proj);
            let covered = intervals::total(proj);
            if (raw_lengths[unit] - covered).abs() > TOLERANCE {
                return Err(Error::InvalidLayout(format!(
                    "unit {unit} covers {:.3e} of height more than once",
                    raw_lengths[unit] - covered
                )));
            }
            if (raw_lengths[unit] - fip[unit]).abs() > TOLERANCE {
                return Err(Error::InvalidLayout(format!(
                    "unit {unit} has length {} but inclusion probability {}",
                    raw_lengths[unit], fip[unit]
                )));
            }
        }

        Ok(Self {
            fip,
            columns: columns.into_iter().map(Arc::from).collect(),
        })
    }

    /// Target first-order inclusion probabilities.
    ///
    /// Every design derived from this one shares the same vector.
    pub fn fip(&self) -> &[f64] {
        &self.fip
    }

    pub(crate) fn shared_fip(&self) -> &Arc<[f64]> {
        &self.fip
    }

    /// Population size `N`.
    pub fn num_units(&self) -> usize {
        self.fip.len()
    }

    /// Number of draw-columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Expected sample size `n = Σπ_i`.
    pub fn sample_size(&self) -> f64 {
        self.fip.iter().sum()
    }

    /// Segments of column `c`, sorted bottom to top.
    ///
    /// # Panics
    /// Panics if `c >= num_columns()`.
    pub fn column(&self, c: usize) -> &[Segment] {
        &self.columns[c]
    }

    /// Iterates over all columns.
    pub fn columns(&self) -> impl Iterator<Item = &[Segment]> {
        self.columns.iter().map(|c| &c[..])
    }

    /// Occupied length of column `c`.
    pub fn occupancy(&self, c: usize) -> f64 {
        self.columns[c].iter().map(Segment::len).sum()
    }

    /// All segments of `unit`, paired with their column index.
    pub fn segments_of(&self, unit: usize) -> Vec<(usize, Segment)> {
        self.columns
            .iter()
            .enumerate()
            .flat_map(|(c, col)| {
                col.iter()
                    .filter(move |s| s.unit == unit)
                    .map(move |s| (c, *s))
            })
            .collect()
    }

    /// Measured total segment length per unit.
    ///
    /// Equals [`fip`](Self::fip) within [`TOLERANCE`] for every valid
    /// design.
    pub fn unit_lengths(&self) -> Vec<f64> {
        let mut lengths = vec![0.0; self.num_units()];
        for seg in self.columns.iter().flat_map(|c| c.iter()) {
            lengths[seg.unit] += seg.len();
        }
        lengths
    }

    /// Second-order inclusion probabilities.
    ///
    /// `sip[i][j]` is the length of the height range covered by both `i`
    /// and `j`; the diagonal is the height range covered by `i` alone,
    /// which equals `π_i`. Computed by sweeping the elementary height
    /// intervals between segment edges.
    ///
    /// # Complexity
    /// O(B · (C log S + k²)) for B breakpoints, C columns, S segments per
    /// column and k units covering a height (k ≤ C).
    pub fn sip(&self) -> Vec<Vec<f64>> {
        let n = self.num_units();
        let mut matrix = vec![vec![0.0; n]; n];

        let mut breaks: Vec<f64> = self
            .columns
            .iter()
            .flat_map(|c| c.iter())
            .flat_map(|s| [s.start, s.end])
            .collect();
        breaks.push(0.0);
        breaks.push(1.0);
        breaks.sort_by(f64::total_cmp);
        breaks.dedup_by(|a, b| (*a - *b).abs() <= EPS);

        let mut covering = Vec::with_capacity(self.num_columns());
        for w in breaks.windows(2) {
            let len = w[1] - w[0];
            if len <= EPS {
                continue;
            }
            let mid = 0.5 * (w[0] + w[1]);
            covering.clear();
            covering.extend(self.columns.iter().filter_map(|col| unit_at(col, mid)));
            covering.sort_unstable();
            covering.dedup();

            for (k, &i) in covering.iter().enumerate() {
                matrix[i][i] += len;
                for &j in &covering[k + 1..] {
                    matrix[i][j] += len;
                    matrix[j][i] += len;
                }
            }
        }
        matrix
    }

    /// Checks whether `switch` can be applied.
    ///
    /// # Errors
    ///
    /// `InfeasibleSwitch` describing the first violated condition.
    pub fn check_switch(&self, switch: &Switch) -> Result<()> {
        let Switch {
            unit_a,
            unit_b,
            column,
            amount,
            at_a,
            at_b,
        } = *switch;

        if column >= self.num_columns() {
            return Err(Error::InfeasibleSwitch(format!(
                "column {column} out of range ({} columns)",
                self.num_columns()
            )));
        }
        if unit_a >= self.num_units() || unit_b >= self.num_units() {
            return Err(Error::InfeasibleSwitch(format!(
                "units ({unit_a}, {unit_b}) out of range ({} units)",
                self.num_units()
            )));
        }
        if unit_a == unit_b {
            return Err(Error::InfeasibleSwitch(format!(
                "unit {unit_a} cannot switch with itself"
            )));
        }
        if !(amount.is_finite() && amount > EPS) {
            return Err(Error::InfeasibleSwitch(format!(
                "switch amount must be positive, got {amount}"
            )));
        }

        let col = &self.columns[column];
        let (a_lo, a_hi) = (at_a, at_a + amount);
        let (b_lo, b_hi) = (at_b, at_b + amount);
        if covering_segment(col, unit_a, a_lo, a_hi).is_none() {
            return Err(Error::InfeasibleSwitch(format!(
                "unit {unit_a} does not cover [{a_lo}, {a_hi}) in column {column}"
            )));
        }
        if covering_segment(col, unit_b, b_lo, b_hi).is_none() {
            return Err(Error::InfeasibleSwitch(format!(
                "unit {unit_b} does not cover [{b_lo}, {b_hi}) in column {column}"
            )));
        }

        for (c, other) in self.columns.iter().enumerate() {
            if c == column {
                continue;
            }
            for seg in other.iter() {
                if seg.unit == unit_a && seg.overlap(b_lo, b_hi) > EPS {
                    return Err(Error::InfeasibleSwitch(format!(
                        "unit {unit_a} already covers height {b_lo} in column {c}"
                    )));
                }
                if seg.unit == unit_b && seg.overlap(a_lo, a_hi) > EPS {
                    return Err(Error::InfeasibleSwitch(format!(
                        "unit {unit_b} already covers height {a_lo} in column {c}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns a new design with `switch` applied.
    ///
    /// Unit lengths and column occupancy are unchanged; only the heights
    /// covered by the two units move.
    ///
    /// # Errors
    ///
    /// `InfeasibleSwitch` if [`check_switch`](Self::check_switch) fails.
    /// Search code filters candidates with `check_switch` first.
    pub fn apply_switch(&self, switch: &Switch) -> Result<Self> {
        self.check_switch(switch)?;

        let col = &self.columns[switch.column];
        let (a_lo, a_hi) = (switch.at_a, switch.at_a + switch.amount);
        let (b_lo, b_hi) = (switch.at_b, switch.at_b + switch.amount);
        let a_idx = covering_segment(col, switch.unit_a, a_lo, a_hi);
        let b_idx = covering_segment(col, switch.unit_b, b_lo, b_hi);

        let mut segs = Vec::with_capacity(col.len() + 4);
        for (k, seg) in col.iter().enumerate() {
            if Some(k) == a_idx {
                segs.push(Segment::new(seg.unit, seg.start, a_lo));
                segs.push(Segment::new(switch.unit_b, a_lo, a_hi));
                segs.push(Segment::new(seg.unit, a_hi, seg.end));
            } else if Some(k) == b_idx {
                segs.push(Segment::new(seg.unit, seg.start, b_lo));
                segs.push(Segment::new(switch.unit_a, b_lo, b_hi));
                segs.push(Segment::new(seg.unit, b_hi, seg.end));
            } else {
                segs.push(*seg);
            }
        }

        let mut columns = self.columns.clone();
        columns[switch.column] = Arc::from(normalize_column(segs));
        Ok(Self {
            fip: Arc::clone(&self.fip),
            columns,
        })
    }

    /// Stable hash of the quantized layout, used to deduplicate states.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.columns.len().hash(&mut hasher);
        for (c, col) in self.columns.iter().enumerate() {
            c.hash(&mut hasher);
            for seg in col.iter() {
                seg.unit.hash(&mut hasher);
                quantize(seg.start).hash(&mut hasher);
                quantize(seg.end).hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Snapshot of the bar layout for an external renderer.
    pub fn render(&self) -> BarLayout {
        BarLayout {
            num_units: self.num_units(),
            fip: self.fip.to_vec(),
            columns: self
                .columns
                .iter()
                .enumerate()
                .map(|(c, col)| ColumnBars {
                    column: c,
                    occupied: col.iter().map(Segment::len).sum(),
                    segments: col
                        .iter()
                        .map(|s| BarSegment {
                            unit: s.unit,
                            start: s.start,
                            length: s.len(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Draws one sample: the sorted units covering a uniform height.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        let u: f64 = rng.random_range(0.0..1.0);
        let mut sample: Vec<usize> = self
            .columns
            .iter()
            .filter_map(|col| unit_at(col, u))
            .collect();
        sample.sort_unstable();
        sample.dedup();
        sample
    }
}

/// Validates a FIP vector and returns its sum.
fn validate_fip(fip: &[f64]) -> Result<f64> {
    if fip.is_empty() {
        return Err(Error::InvalidInclusionProbabilities(
            "probability vector is empty".into(),
        ));
    }
    for (i, &p) in fip.iter().enumerate() {
        if !(p.is_finite() && p > 0.0 && p <= 1.0) {
            return Err(Error::InvalidInclusionProbabilities(format!(
                "π_{i} = {p} is outside (0, 1]"
            )));
        }
    }
    Ok(fip.iter().sum())
}

fn sum_tolerance(n_units: usize) -> f64 {
    TOLERANCE * (n_units as f64).max(1.0)
}

fn column_count(n: f64) -> usize {
    ((n - TOLERANCE).ceil() as usize).max(1)
}

fn sequential_layout(fip: &[f64], num_columns: usize) -> Vec<Vec<Segment>> {
    let mut columns: Vec<Vec<Segment>> = vec![Vec::new(); num_columns];
    let mut col = 0;
    let mut height = 0.0;

    for (unit, &p) in fip.iter().enumerate() {
        let mut remaining = p;
        while remaining > EPS && col < num_columns {
            let room = 1.0 - height;
            if room <= EPS {
                col += 1;
                height = 0.0;
                continue;
            }
            if remaining >= room - EPS {
                columns[col].push(Segment::new(unit, height, 1.0));
                remaining -= room;
                col += 1;
                height = 0.0;
            } else {
                columns[col].push(Segment::new(unit, height, height + remaining));
                height += remaining;
                remaining = 0.0;
            }
        }
    }
    columns
}

/// Sorts a column, drops slivers and merges touching same-unit pieces.
fn normalize_column(mut segs: Vec<Segment>) -> Vec<Segment> {
    segs.retain(|s| s.len() > EPS);
    segs.sort_by(|a, b| a.start.total_cmp(&b.start));
    let mut out: Vec<Segment> = Vec::with_capacity(segs.len());
    for seg in segs {
        match out.last_mut() {
            Some(last) if last.unit == seg.unit && (seg.start - last.end).abs() <= EPS => {
                last.end = seg.end;
            }
            _ => out.push(seg),
        }
    }
    out
}

/// Index of the segment of `unit` containing `[lo, hi)`.
fn covering_segment(col: &[Segment], unit: usize, lo: f64, hi: f64) -> Option<usize> {
    col.iter()
        .position(|s| s.unit == unit && s.start <= lo + EPS && s.end >= hi - EPS)
}

/// Unit covering height `u` in a sorted column.
fn unit_at(col: &[Segment], u: f64) -> Option<usize> {
    let idx = col.partition_point(|s| s.end <= u);
    col.get(idx).filter(|s| s.start <= u).map(|s| s.unit)
}

fn quantize(x: f64) -> i64 {
    (x * FINGERPRINT_SCALE).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use proptest::prelude::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    fn half_design() -> Design {
        Design::from_fip(&[0.5, 0.5, 0.5, 0.5]).unwrap()
    }

    #[test]
    fn test_sequential_layout() {
        let d = half_design();
        assert_eq!(d.num_columns(), 2);
        assert_eq!(
            d.column(0),
            &[Segment::new(0, 0.0, 0.5), Segment::new(1, 0.5, 1.0)]
        );
        assert_eq!(
            d.column(1),
            &[Segment::new(2, 0.0, 0.5), Segment::new(3, 0.5, 1.0)]
        );
    }

    #[test]
    fn test_unit_split_across_columns() {
        let d = Design::from_fip(&[0.7, 0.6, 0.7]).unwrap();
        assert_eq!(d.num_columns(), 2);
        let pieces = d.segments_of(1);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].0, 0);
        assert_eq!(pieces[1].0, 1);
        assert_close(pieces[0].1.start, 0.7);
        assert_close(pieces[1].1.end, 0.3);
        assert_close(d.unit_lengths()[1], 0.6);
    }

    #[test]
    fn test_fractional_sample_size() {
        let d = Design::from_fip(&[0.4, 0.4, 0.5]).unwrap();
        assert_eq!(d.num_columns(), 2);
        assert_close(d.sample_size(), 1.3);
        assert_close(d.occupancy(0), 1.0);
        assert_close(d.occupancy(1), 0.3);
    }

    #[test]
    fn test_rejects_invalid_fip() {
        assert!(matches!(
            Design::from_fip(&[]),
            Err(Error::InvalidInclusionProbabilities(_))
        ));
        assert!(Design::from_fip(&[0.5, 0.0]).is_err());
        assert!(Design::from_fip(&[0.5, 1.2]).is_err());
        assert!(Design::from_fip(&[0.5, f64::NAN]).is_err());
        assert!(Design::from_fip(&[-0.1, 0.5]).is_err());
    }

    #[test]
    fn test_declared_sample_size() {
        let fip = [0.5, 0.5, 0.5, 0.5];
        assert!(Design::from_fip_with_size(&fip, 2.0).is_ok());
        assert!(matches!(
            Design::from_fip_with_size(&fip, 3.0),
            Err(Error::InvalidInclusionProbabilities(_))
        ));
    }

    #[test]
    fn test_sip_of_initial_layout() {
        let sip = half_design().sip();
        assert_close(sip[0][2], 0.5);
        assert_close(sip[1][3], 0.5);
        assert_close(sip[0][1], 0.0);
        assert_close(sip[0][3], 0.0);
        for i in 0..4 {
            assert_close(sip[i][i], 0.5);
        }
    }

    #[test]
    fn test_switch_changes_sip_not_fip() {
        let d = half_design();
        let sw = Switch::new(0, 1, 0, 0.25, 0.0, 0.5);
        let next = d.apply_switch(&sw).unwrap();

        let lengths = next.unit_lengths();
        for (l, p) in lengths.iter().zip(next.fip()) {
            assert_close(*l, *p);
        }
        let sip = next.sip();
        // Unit 0 now covers [0.25, 0.75): half against unit 2, half against unit 3.
        assert_close(sip[0][2], 0.25);
        assert_close(sip[0][3], 0.25);
        assert_close(sip[0][0], 0.5);
        // The original design is untouched.
        assert_eq!(d, half_design());
    }

    #[test]
    fn test_switch_round_trip() {
        let d = half_design();
        let sw = Switch::new(0, 1, 0, 0.25, 0.0, 0.5);
        let back = d.apply_switch(&sw).unwrap().apply_switch(&sw.inverse()).unwrap();
        assert_eq!(back, d);
        assert_eq!(back.fingerprint(), d.fingerprint());
    }

    #[test]
    fn test_switch_shares_untouched_columns() {
        let d = half_design();
        let next = d.apply_switch(&Switch::new(2, 3, 1, 0.1, 0.0, 0.5)).unwrap();
        assert!(Arc::ptr_eq(&d.columns[0], &next.columns[0]));
        assert!(!Arc::ptr_eq(&d.columns[1], &next.columns[1]));
    }

    #[test]
    fn test_infeasible_switches() {
        let d = half_design();
        let cases = [
            Switch::new(0, 1, 5, 0.1, 0.0, 0.5),  // column out of range
            Switch::new(0, 9, 0, 0.1, 0.0, 0.5),  // unit out of range
            Switch::new(0, 0, 0, 0.1, 0.0, 0.2),  // same unit
            Switch::new(0, 1, 0, 0.0, 0.0, 0.5),  // zero amount
            Switch::new(0, 1, 0, 0.6, 0.0, 0.5),  // piece longer than segment
            Switch::new(0, 2, 0, 0.1, 0.0, 0.5),  // unit 2 is not in column 0
        ];
        for sw in cases {
            assert!(
                matches!(d.apply_switch(&sw), Err(Error::InfeasibleSwitch(_))),
                "expected {sw:?} to be infeasible"
            );
        }
    }

    #[test]
    fn test_switch_rejects_height_collision() {
        // Unit 1 occupies [0.7, 1) in column 0 and [0, 0.3) in column 1.
        let d = Design::from_fip(&[0.7, 0.6, 0.7]).unwrap();
        // Moving unit 1 down to [0, 0.2) in column 0 collides with its piece in column 1.
        let sw = Switch::new(1, 0, 0, 0.2, 0.8, 0.0);
        assert!(matches!(
            d.check_switch(&sw),
            Err(Error::InfeasibleSwitch(_))
        ));
        // Moving it to [0.4, 0.6) is fine.
        let sw = Switch::new(1, 0, 0, 0.2, 0.8, 0.4);
        assert!(d.check_switch(&sw).is_ok());
    }

    #[test]
    fn test_from_columns_validates() {
        let fip = [0.5, 0.5];
        let ok = vec![vec![Segment::new(0, 0.0, 0.5), Segment::new(1, 0.5, 1.0)]];
        assert!(Design::from_columns(&fip, ok).is_ok());

        let overlap = vec![vec![Segment::new(0, 0.0, 0.6), Segment::new(1, 0.5, 1.0)]];
        assert!(matches!(
            Design::from_columns(&fip, overlap),
            Err(Error::InvalidLayout(_))
        ));

        let short = vec![vec![Segment::new(0, 0.0, 0.4), Segment::new(1, 0.5, 1.0)]];
        assert!(matches!(
            Design::from_columns(&fip, short),
            Err(Error::InvalidLayout(_))
        ));

        let wrong_count = vec![vec![], vec![]];
        assert!(matches!(
            Design::from_columns(&fip, wrong_count),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_from_columns_rejects_double_cover() {
        let fip = [1.0, 0.5, 0.5];
        // Unit 0 covers [0, 0.5) in both columns.
        let cols = vec![
            vec![Segment::new(0, 0.0, 0.5), Segment::new(1, 0.5, 1.0)],
            vec![Segment::new(0, 0.0, 0.5), Segment::new(2, 0.5, 1.0)],
        ];
        assert!(matches!(
            Design::from_columns(&fip, cols),
            Err(Error::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_render_matches_segments() {
        let d = Design::from_fip(&[0.7, 0.6, 0.7]).unwrap();
        let layout = d.render();
        assert_eq!(layout.num_units, 3);
        assert_eq!(layout.columns.len(), 2);
        let total: f64 = layout
            .columns
            .iter()
            .flat_map(|c| c.segments.iter())
            .filter(|s| s.unit == 1)
            .map(|s| s.length)
            .sum();
        assert_close(total, 0.6);
        assert_close(layout.columns[0].occupied, 1.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_render_serializes() {
        let layout = half_design().render();
        let json = serde_json::to_string(&layout).unwrap();
        let back: BarLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);
    }

    #[test]
    fn test_draw_frequencies_match_fip() {
        let d = Design::from_fip(&[0.2, 0.5, 0.8, 0.5]).unwrap();
        let mut rng = create_rng(42);
        let mut counts = [0usize; 4];
        let trials = 20_000;
        for _ in 0..trials {
            let sample = d.draw(&mut rng);
            assert_eq!(sample.len(), 2, "fixed-size design must draw 2 units");
            for u in sample {
                counts[u] += 1;
            }
        }
        for (count, p) in counts.iter().zip(d.fip()) {
            let freq = *count as f64 / trials as f64;
            assert!((freq - p).abs() < 0.02, "freq {freq} vs π {p}");
        }
    }

    #[test]
    fn test_fingerprint_distinguishes_layouts() {
        let d = half_design();
        let next = d.apply_switch(&Switch::new(0, 1, 0, 0.25, 0.0, 0.5)).unwrap();
        assert_ne!(d.fingerprint(), next.fingerprint());
        assert_eq!(d.fingerprint(), half_design().fingerprint());
    }

    fn fip_strategy() -> impl Strategy<Value = Vec<f64>> {
        (prop::collection::vec(0.05f64..1.0, 2..12), 0.1f64..1.0).prop_map(|(sizes, frac)| {
            let n = frac * sizes.len() as f64;
            crate::random::inclusion_probabilities(&sizes, n).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_layout_preserves_fip(fip in fip_strategy()) {
            let d = Design::from_fip(&fip).unwrap();
            prop_assert_eq!(d.fip(), &fip[..]);
            for (l, p) in d.unit_lengths().iter().zip(&fip) {
                prop_assert!((l - p).abs() < 1e-9);
            }
            for c in 0..d.num_columns() {
                prop_assert!(d.occupancy(c) <= 1.0 + 1e-9);
            }
        }

        #[test]
        fn prop_sip_symmetric_with_fip_diagonal(fip in fip_strategy()) {
            let d = Design::from_fip(&fip).unwrap();
            let sip = d.sip();
            for i in 0..fip.len() {
                prop_assert!((sip[i][i] - fip[i]).abs() < 1e-9);
                for j in 0..fip.len() {
                    prop_assert_eq!(sip[i][j], sip[j][i]);
                    prop_assert!(sip[i][j] <= fip[i].min(fip[j]) + 1e-9);
                }
            }
        }
    }
}
