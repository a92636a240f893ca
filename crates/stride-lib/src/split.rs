use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::BTreeMap;

use crate::dataset::MergedRow;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainTestSplit {
    pub train: Vec<MergedRow>,
    pub test: Vec<MergedRow>,
}

/// Hold out `test_fraction` of each participant's rows.
///
/// Per participant, `round(test_fraction * n)` rows are drawn with a seeded
/// shuffle. Both outputs keep the input row order.
pub fn stratified_split(rows: &[MergedRow], test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        bail!("test fraction must lie in (0, 1), got {}", test_fraction);
    }
    let mut by_participant: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        by_participant.entry(row.subject_id).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut in_test = vec![false; rows.len()];
    for indices in by_participant.values_mut() {
        indices.shuffle(&mut rng);
        let n_test = (test_fraction * indices.len() as f64).round() as usize;
        for &idx in indices.iter().take(n_test) {
            in_test[idx] = true;
        }
    }

    let mut split = TrainTestSplit::default();
    for (row, test) in rows.iter().zip(in_test) {
        if test {
            split.test.push(*row);
        } else {
            split.train.push(*row);
        }
    }
    Ok(split)
}
