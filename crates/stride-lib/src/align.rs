//! Joins HR, EDA and derived respiration onto the HR timeline.
//!
//! HR and EDA are matched on identical seconds only (inner join). Seconds
//! covered by just one of the two sensors are dropped rather than filled, so
//! a subject's row count is the overlap of both recordings. Respiration is
//! attached by nearest timestamp, computed over the full HR grid.

use log::debug;

use crate::dataset::MergedRow;
use crate::signal::{RespirationSample, RespirationSeries, SignalSeries};
use crate::timeline::TimelineGrid;

/// HR and EDA values sharing one second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedSample {
    pub time: i64,
    pub hr: f64,
    pub eda: f64,
}

/// Inner join of HR and EDA on absolute second, in HR order.
pub fn exact_join(hr: &SignalSeries, eda: &SignalSeries) -> Vec<JoinedSample> {
    hr.samples()
        .filter_map(|sample| {
            eda.value_at(sample.time).map(|eda| JoinedSample {
                time: sample.time,
                hr: sample.value,
                eda,
            })
        })
        .collect()
}

/// Sample closest in time to `time`; equidistant candidates resolve to the earlier one.
///
/// With several samples at the same second the last of them is the backward
/// candidate and the first is the forward candidate.
pub fn nearest_sample(samples: &[RespirationSample], time: i64) -> Option<&RespirationSample> {
    let upto = samples.partition_point(|s| s.time <= time);
    let from = samples.partition_point(|s| s.time < time);
    let backward = upto.checked_sub(1).map(|idx| &samples[idx]);
    let forward = samples.get(from);
    match (backward, forward) {
        (Some(b), Some(f)) => {
            if time.abs_diff(b.time) <= f.time.abs_diff(time) {
                Some(b)
            } else {
                Some(f)
            }
        }
        (Some(b), None) => Some(b),
        (None, f) => f,
    }
}

/// Nearest respiration rate for every second on the grid, by grid index.
///
/// Every entry is `Some` unless `resp` is empty.
pub fn nearest_join(grid: &TimelineGrid, resp: &RespirationSeries) -> Vec<Option<f64>> {
    grid.seconds()
        .map(|time| nearest_sample(&resp.samples, time).map(|s| s.rate))
        .collect()
}

/// (HR ∩ EDA) left-joined with the grid's nearest respiration values.
///
/// Rows come back unlabeled (`label = 0`) and without a subject id.
pub fn align(
    grid: &TimelineGrid,
    hr: &SignalSeries,
    eda: &SignalSeries,
    resp: &RespirationSeries,
) -> Vec<MergedRow> {
    let joined = exact_join(hr, eda);
    let respr = nearest_join(grid, resp);
    debug!(
        "aligned {} HR seconds with {} EDA seconds: {} shared, {} beats",
        hr.len(),
        eda.len(),
        joined.len(),
        resp.len()
    );
    joined
        .into_iter()
        .map(|sample| MergedRow {
            hr: sample.hr,
            time: sample.time,
            eda: sample.eda,
            respr: grid.index_of(sample.time).and_then(|idx| respr[idx]),
            label: 0,
            subject_id: 0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::build_timeline;

    fn series(start: i64, len: usize) -> SignalSeries {
        SignalSeries::new(start, (0..len).map(|i| i as f64).collect())
    }

    fn resp(points: &[(i64, f64)]) -> RespirationSeries {
        RespirationSeries {
            samples: points
                .iter()
                .map(|&(time, rate)| RespirationSample { time, rate })
                .collect(),
        }
    }

    #[test]
    fn exact_join_keeps_only_overlap() {
        let hr = series(100, 10);
        let eda = series(105, 10);
        let joined = exact_join(&hr, &eda);
        let times: Vec<i64> = joined.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![105, 106, 107, 108, 109]);
        assert_eq!(joined[0].hr, 5.0);
        assert_eq!(joined[0].eda, 0.0);
    }

    #[test]
    fn exact_join_without_overlap_is_empty() {
        assert!(exact_join(&series(0, 5), &series(5, 5)).is_empty());
    }

    #[test]
    fn nearest_ties_prefer_earlier_sample() {
        let r = resp(&[(10, 60.0), (12, 120.0)]);
        assert_eq!(nearest_sample(&r.samples, 11).unwrap().rate, 60.0);
        assert_eq!(nearest_sample(&r.samples, 12).unwrap().rate, 120.0);
        assert_eq!(nearest_sample(&r.samples, 3).unwrap().rate, 60.0);
        assert_eq!(nearest_sample(&r.samples, 40).unwrap().rate, 120.0);
    }

    #[test]
    fn nearest_with_duplicate_seconds() {
        let r = resp(&[(10, 50.0), (10, 70.0), (13, 90.0)]);
        // exact hit resolves to the last beat of that second
        assert_eq!(nearest_sample(&r.samples, 10).unwrap().rate, 70.0);
        assert_eq!(nearest_sample(&r.samples, 9).unwrap().rate, 50.0);
    }

    #[test]
    fn nearest_handles_extreme_distances() {
        let r = resp(&[(i64::MIN, 50.0), (i64::MAX, 70.0)]);
        assert_eq!(nearest_sample(&r.samples, 0).unwrap().rate, 70.0);
        assert_eq!(nearest_sample(&r.samples, -1).unwrap().rate, 50.0);
    }

    #[test]
    fn nearest_join_covers_every_grid_second() {
        let grid = build_timeline(100, 20).unwrap();
        let values = nearest_join(&grid, &resp(&[(107, 75.0)]));
        assert_eq!(values.len(), 20);
        assert!(values.iter().all(|v| *v == Some(75.0)));
    }

    #[test]
    fn empty_respiration_leaves_values_absent() {
        let grid = build_timeline(100, 10).unwrap();
        let rows = align(&grid, &series(100, 10), &series(100, 10), &RespirationSeries::default());
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().all(|row| row.respr.is_none()));
    }

    #[test]
    fn respiration_uses_full_grid_not_overlap() {
        // the only beat lies in HR-only territory but still reaches the overlap rows
        let grid = build_timeline(100, 10).unwrap();
        let rows = align(&grid, &series(100, 10), &series(105, 10), &resp(&[(101, 80.0)]));
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|row| row.respr == Some(80.0)));
    }
}
