//! Column-wise recombination of designs and FIP repair.
//!
//! A child inherits each column whole from one of its parents. Because a
//! unit may span several columns, mixing columns from two layouts can
//! leave a unit covering some height twice, holding more than its `π_i`,
//! or holding less. [`repair`] restores the layout invariants:
//!
//! 1. **Deduplicate**: scanning columns left to right, cut every piece of a
//!    unit that covers a height the unit already occupies
//! 2. **Trim**: shorten surplus units from the top of their right-most
//!    segments down
//! 3. **Refill**: place missing mass into free column space at heights
//!    the unit does not yet cover
//! 4. **Validate**: rebuild through the checked design constructor
//!
//! When step 3 runs out of usable space the child is rejected.
//!
//! # References
//!
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"
//! - Michalewicz (1996), *Genetic Algorithms + Data Structures = Evolution
//!   Programs*, §7 (repair of infeasible offspring)

use crate::design::intervals::{self, EPS};
use crate::design::{Design, Segment};
use crate::error::{Error, Result};
use rand::Rng;

/// Outcome of a successful [`repair`].
#[derive(Debug, Clone)]
pub struct Repaired {
    /// The valid child design.
    pub design: Design,
    /// Whether any segment had to be cut, trimmed or added.
    pub modified: bool,
}

/// Uniform column-wise crossover.
///
/// Each column of the child is copied from `a` or `b` with equal
/// probability. The result is raw material for [`repair`].
///
/// # Errors
///
/// `DimensionMismatch` if the parents have different column or unit counts.
pub fn column_crossover<R: Rng>(a: &Design, b: &Design, rng: &mut R) -> Result<Vec<Vec<Segment>>> {
    if a.num_units() != b.num_units() {
        return Err(Error::DimensionMismatch {
            expected: a.num_units(),
            found: b.num_units(),
        });
    }
    if a.num_columns() != b.num_columns() {
        return Err(Error::DimensionMismatch {
            expected: a.num_columns(),
            found: b.num_columns(),
        });
    }

    Ok(a
        .columns()
        .zip(b.columns())
        .map(|(ca, cb)| {
            if rng.random_bool(0.5) {
                ca.to_vec()
            } else {
                cb.to_vec()
            }
        })
        .collect())
}

/// Repairs raw child columns into a valid design sharing `template`'s FIP.
///
/// # Errors
///
/// - `InvalidLayout` if a unit's deficit cannot be placed, or the
///   repaired layout still fails validation
/// - `DimensionMismatch` if the column count is wrong
pub fn repair(template: &Design, mut columns: Vec<Vec<Segment>>) -> Result<Repaired> {
    let fip = template.fip();
    let n_units = fip.len();
    let mut modified = false;

    if let Some(seg) = columns.iter().flatten().find(|s| s.unit >= n_units) {
        return Err(Error::InvalidLayout(format!(
            "unit {} outside population of {n_units}",
            seg.unit
        )));
    }

    // 1. Deduplicate.
    let mut covered: Vec<Vec<(f64, f64)>> = vec![Vec::new(); n_units];
    for column in columns.iter_mut() {
        let mut segs = std::mem::take(column);
        segs.sort_by(|x, y| x.start.total_cmp(&y.start));
        for seg in segs {
            let pieces = intervals::subtract(seg.start, seg.end, &covered[seg.unit]);
            if !matches!(pieces.as_slice(), [(s, e)] if *s == seg.start && *e == seg.end) {
                modified = true;
            }
            column.extend(pieces.into_iter().map(|(s, e)| Segment::new(seg.unit, s, e)));
        }
        for seg in column.iter() {
            covered[seg.unit].push((seg.start, seg.end));
        }
        for proj in covered.iter_mut() {
            intervals::normalize(proj);
        }
    }

    // 2. Trim.
    let mut excess: Vec<f64> = (0..n_units)
        .map(|u| intervals::total(&covered[u]) - fip[u])
        .collect();
    if excess.iter().any(|&x| x > EPS) {
        modified = true;
        for column in columns.iter_mut().rev() {
            for seg in column.iter_mut().rev() {
                let surplus = &mut excess[seg.unit];
                if *surplus > EPS {
                    let cut = surplus.min(seg.len());
                    seg.end -= cut;
                    *surplus -= cut;
                }
            }
            column.retain(|s| s.len() > EPS);
        }
        covered = projections(&columns, n_units);
    }

    // 3. Refill.
    for unit in 0..n_units {
        let mut deficit = fip[unit] - intervals::total(&covered[unit]);
        if deficit <= EPS {
            continue;
        }
        modified = true;
        for column in columns.iter_mut() {
            if deficit <= EPS {
                break;
            }
            for (lo, hi) in usable_space(column, &covered[unit]) {
                let take = deficit.min(hi - lo);
                column.push(Segment::new(unit, lo, lo + take));
                covered[unit].push((lo, lo + take));
                deficit -= take;
                if deficit <= EPS {
                    break;
                }
            }
            intervals::normalize(&mut covered[unit]);
        }
        if deficit > EPS {
            return Err(Error::InvalidLayout(format!(
                "no free height left for {deficit:.3e} of unit {unit}"
            )));
        }
    }

    // 4. Validate.
    let design = Design::from_parts(template.shared_fip().clone(), columns)?;
    Ok(Repaired { design, modified })
}

/// Per-unit projections of raw columns.
fn projections(columns: &[Vec<Segment>], n_units: usize) -> Vec<Vec<(f64, f64)>> {
    let mut out: Vec<Vec<(f64, f64)>> = vec![Vec::new(); n_units];
    for seg in columns.iter().flatten() {
        out[seg.unit].push((seg.start, seg.end));
    }
    for proj in out.iter_mut() {
        intervals::normalize(proj);
    }
    out
}

/// Free intervals of `column` not already covered by the unit.
fn usable_space(column: &[Segment], unit_covered: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut occupied: Vec<(f64, f64)> = column.iter().map(|s| (s.start, s.end)).collect();
    intervals::normalize(&mut occupied);
    intervals::subtract(0.0, 1.0, &occupied)
        .into_iter()
        .flat_map(|(lo, hi)| intervals::subtract(lo, hi, unit_covered))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{create_rng, inclusion_probabilities};
    use crate::switch::SwitchEnumerator;
    use proptest::prelude::*;

    fn seg(unit: usize, start: f64, end: f64) -> Segment {
        Segment::new(unit, start, end)
    }

    fn assert_fip(design: &Design) {
        for (l, p) in design.unit_lengths().iter().zip(design.fip()) {
            assert!((l - p).abs() < 1e-9, "length {l} vs fip {p}");
        }
    }

    // π = [0.75, 0.75, 0.25]: unit 1 spans both columns.
    fn spanning_parents() -> (Design, Design) {
        let fip = [0.75, 0.75, 0.25];
        let a = Design::from_fip(&fip).unwrap();
        let b = Design::from_columns(
            &fip,
            vec![
                vec![seg(1, 0.0, 0.25), seg(0, 0.25, 1.0)],
                vec![seg(2, 0.0, 0.25), seg(1, 0.25, 0.75)],
            ],
        )
        .unwrap();
        (a, b)
    }

    #[test]
    fn test_crossover_takes_whole_columns() {
        let (a, b) = spanning_parents();
        let mut rng = create_rng(5);
        for _ in 0..20 {
            let child = column_crossover(&a, &b, &mut rng).unwrap();
            assert_eq!(child.len(), 2);
            for (c, column) in child.iter().enumerate() {
                assert!(column.as_slice() == a.column(c) || column.as_slice() == b.column(c));
            }
        }
    }

    #[test]
    fn test_crossover_rejects_mismatched_parents() {
        let a = Design::from_fip(&[0.5, 0.5]).unwrap();
        let b = Design::from_fip(&[0.5, 0.5, 0.5, 0.5]).unwrap();
        assert!(matches!(
            column_crossover(&a, &b, &mut create_rng(1)),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_repair_keeps_valid_child_untouched() {
        let (a, b) = spanning_parents();
        let columns = vec![a.column(0).to_vec(), b.column(1).to_vec()];
        let repaired = repair(&a, columns).unwrap();
        assert!(!repaired.modified);
        assert_fip(&repaired.design);
    }

    #[test]
    fn test_repair_removes_double_cover_and_refills() {
        let (a, b) = spanning_parents();
        // Unit 1 covers [0, 0.25) in both columns.
        let columns = vec![b.column(0).to_vec(), a.column(1).to_vec()];
        let repaired = repair(&a, columns).unwrap();

        assert!(repaired.modified);
        assert_fip(&repaired.design);
        let sip = repaired.design.sip();
        assert!((sip[1][1] - 0.75).abs() < 1e-9);
        let col1 = repaired.design.column(1);
        assert!(col1.iter().any(|s| s.unit == 1 && (s.start - 0.75).abs() < 1e-12));
    }

    #[test]
    fn test_repair_trims_surplus() {
        let fip = [0.75, 0.75, 0.25];
        let a = Design::from_fip(&fip).unwrap();
        let b = Design::from_columns(
            &fip,
            vec![
                vec![seg(0, 0.0, 0.5), seg(1, 0.5, 1.0)],
                vec![seg(1, 0.0, 0.25), seg(2, 0.25, 0.5), seg(0, 0.75, 1.0)],
            ],
        )
        .unwrap();
        // Unit 1 holds 1.0, unit 0 only 0.5.
        let columns = vec![b.column(0).to_vec(), a.column(1).to_vec()];
        let repaired = repair(&a, columns).unwrap();

        assert!(repaired.modified);
        assert_fip(&repaired.design);
    }

    #[test]
    fn test_repair_rejects_when_no_height_is_free() {
        let fip = [0.75, 0.75, 0.5];
        let a = Design::from_fip(&fip).unwrap();
        let b = Design::from_columns(
            &fip,
            vec![
                vec![seg(1, 0.0, 0.25), seg(0, 0.25, 1.0)],
                vec![seg(2, 0.0, 0.5), seg(1, 0.5, 1.0)],
            ],
        )
        .unwrap();
        let columns = vec![b.column(0).to_vec(), a.column(1).to_vec()];
        assert!(matches!(repair(&a, columns), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_repair_rejects_unknown_unit() {
        let a = Design::from_fip(&[0.5, 0.5]).unwrap();
        let columns = vec![vec![seg(0, 0.0, 0.5), seg(7, 0.5, 1.0)]];
        assert!(matches!(repair(&a, columns), Err(Error::InvalidLayout(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_repaired_children_are_valid(
            sizes in prop::collection::vec(0.05f64..1.0, 3..9),
            frac in 0.2f64..0.9,
            seed in any::<u64>(),
        ) {
            let n = frac * sizes.len() as f64;
            let fip = inclusion_probabilities(&sizes, n).unwrap();
            let root = Design::from_fip(&fip).unwrap();
            let enumerator = SwitchEnumerator::new(0.2, 3).unwrap();
            let mut rng = create_rng(seed);

            let walk = |rng: &mut rand::rngs::StdRng| {
                let mut d = root.clone();
                for _ in 0..10 {
                    if let Some(next) = enumerator.neighbor(&d, rng) {
                        d = next;
                    }
                }
                d
            };
            let a = walk(&mut rng);
            let b = walk(&mut rng);

            for _ in 0..5 {
                let columns = column_crossover(&a, &b, &mut rng).unwrap();
                if let Ok(child) = repair(&a, columns) {
                    for (l, p) in child.design.unit_lengths().iter().zip(&fip) {
                        prop_assert!((l - p).abs() < 1e-9);
                    }
                    let raw: Vec<Vec<_>> = child.design.columns().map(|c| c.to_vec()).collect();
                    prop_assert!(Design::from_columns(&fip, raw).is_ok());
                }
            }
        }
    }
}
