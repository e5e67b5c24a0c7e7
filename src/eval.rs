//! Batch criterion evaluation, optionally parallel.

use crate::criteria::Criterion;
use crate::design::Design;

/// Scores every design, keeping input order.
///
/// With the `parallel` feature and `parallel = true` the batch is
/// evaluated on the rayon pool. Results are collected in input order, so
/// the outcome does not depend on scheduling.
#[cfg(feature = "parallel")]
pub(crate) fn evaluate_batch<C: Criterion>(
    criterion: &C,
    designs: Vec<Design>,
    parallel: bool,
) -> Vec<(Design, f64)> {
    use rayon::prelude::*;

    if parallel {
        designs
            .into_par_iter()
            .map(|d| {
                let v = criterion.evaluate(&d);
                (d, v)
            })
            .collect()
    } else {
        evaluate_sequential(criterion, designs)
    }
}

/// Scores every design, keeping input order.
#[cfg(not(feature = "parallel"))]
pub(crate) fn evaluate_batch<C: Criterion>(
    criterion: &C,
    designs: Vec<Design>,
    _parallel: bool,
) -> Vec<(Design, f64)> {
    evaluate_sequential(criterion, designs)
}

fn evaluate_sequential<C: Criterion>(criterion: &C, designs: Vec<Design>) -> Vec<(Design, f64)> {
    designs
        .into_iter()
        .map(|d| {
            let v = criterion.evaluate(&d);
            (d, v)
        })
        .collect()
}
