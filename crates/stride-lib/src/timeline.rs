use std::ops::Range;

use crate::error::PipelineError;

/// Canonical per-second join key for one subject.
///
/// Start and extent always come from the HR channel. EDA and IBI are
/// resampled onto this grid, never the other way around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineGrid {
    start: i64,
    len: usize,
}

impl TimelineGrid {
    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last second on the grid; cannot overflow, `build_timeline` checks it.
    pub fn end(&self) -> i64 {
        self.start + self.len as i64
    }

    pub fn seconds(&self) -> Range<i64> {
        self.start..self.end()
    }

    /// Position of `time` on the grid.
    pub fn index_of(&self, time: i64) -> Option<usize> {
        if self.seconds().contains(&time) {
            Some((time - self.start) as usize)
        } else {
            None
        }
    }
}

/// Build `[hr_start, hr_start + hr_length - 1]`.
pub fn build_timeline(hr_start: i64, hr_length: usize) -> Result<TimelineGrid, PipelineError> {
    if hr_length < 1 {
        return Err(PipelineError::InvalidLength { length: hr_length });
    }
    i64::try_from(hr_length)
        .ok()
        .and_then(|len| hr_start.checked_add(len))
        .ok_or(PipelineError::TimelineOverflow {
            start: hr_start,
            length: hr_length,
        })?;
    Ok(TimelineGrid {
        start: hr_start,
        len: hr_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_one_entry_per_hr_sample() {
        let grid = build_timeline(1_500_000_000, 4).unwrap();
        let seconds: Vec<i64> = grid.seconds().collect();
        assert_eq!(
            seconds,
            vec![1_500_000_000, 1_500_000_001, 1_500_000_002, 1_500_000_003]
        );
        assert_eq!(grid.index_of(1_500_000_003), Some(3));
        assert_eq!(grid.index_of(1_500_000_004), None);
    }

    #[test]
    fn zero_length_is_rejected() {
        let err = build_timeline(10, 0).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidLength { length: 0 }));
    }

    #[test]
    fn grid_past_i64_max_is_rejected() {
        let err = build_timeline(i64::MAX - 1, 5).unwrap_err();
        assert!(matches!(err, PipelineError::TimelineOverflow { length: 5, .. }));
        let grid = build_timeline(i64::MAX - 5, 5).unwrap();
        assert_eq!(grid.end(), i64::MAX);
    }

    #[test]
    fn negative_start_is_allowed() {
        let grid = build_timeline(-2, 3).unwrap();
        assert_eq!(grid.seconds().collect::<Vec<_>>(), vec![-2, -1, 0]);
    }
}
