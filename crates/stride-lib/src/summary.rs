use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dataset::MergedRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub rows: usize,
    pub stressed: usize,
    pub baseline: usize,
    pub missing_respr: usize,
}

impl LabelCounts {
    fn add(&mut self, row: &MergedRow) {
        self.rows += 1;
        if row.is_stressed() {
            self.stressed += 1;
        } else {
            self.baseline += 1;
        }
        if row.respr.is_none() {
            self.missing_respr += 1;
        }
    }
}

/// Label distribution of a dataset, overall and per participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total: LabelCounts,
    pub participants: BTreeMap<u32, LabelCounts>,
}

pub fn summarize(rows: &[MergedRow]) -> DatasetSummary {
    let mut summary = DatasetSummary::default();
    for row in rows {
        summary.total.add(row);
        summary.participants.entry(row.subject_id).or_default().add(row);
    }
    summary
}
