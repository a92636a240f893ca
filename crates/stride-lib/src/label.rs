use crate::dataset::MergedRow;
use crate::error::PipelineError;

/// Label for seconds before the first boundary, and for untagged subjects.
pub const BASELINE_LABEL: u8 = 0;

/// Strictly increasing boundary timestamps of one subject's protocol.
///
/// Boundary `i` opens segment `i`; even segments are stress, odd segments
/// are the return to baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryTagList {
    tags: Vec<i64>,
}

impl BoundaryTagList {
    pub fn new(tags: Vec<i64>) -> Result<Self, PipelineError> {
        if tags.is_empty() {
            return Err(PipelineError::EmptyBoundaryList);
        }
        for (index, pair) in tags.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(PipelineError::UnsortedBoundary {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(Self { tags })
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Index of the segment containing `time`, `None` before the first boundary.
    ///
    /// Segment `i` is `[t_i, t_{i+1})`; the last one is open-ended here and
    /// gets its upper bound from the rows being labeled.
    pub fn segment_index(&self, time: i64) -> Option<usize> {
        self.tags.partition_point(|&tag| tag <= time).checked_sub(1)
    }
}

/// Segment 0 is stressed (1), segment 1 baseline (0), alternating.
pub fn label_for_segment(segment: usize) -> u8 {
    1 - (segment % 2) as u8
}

/// Stamp every row with the label of its segment.
///
/// The final segment is open-ended, so it covers every row from the last
/// boundary through the latest second in `rows`. Row order is irrelevant.
pub fn apply_labels(rows: &mut [MergedRow], tags: &BoundaryTagList) {
    for row in rows.iter_mut() {
        row.label = tags
            .segment_index(row.time)
            .map_or(BASELINE_LABEL, label_for_segment);
    }
}

/// Explicitly reset every row to the baseline label.
pub fn clear_labels(rows: &mut [MergedRow]) {
    for row in rows.iter_mut() {
        row.label = BASELINE_LABEL;
    }
}
