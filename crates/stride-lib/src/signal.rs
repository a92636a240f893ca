use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Convert an already rounded second count to `i64`.
///
/// `None` for NaN, infinities and anything outside the `i64` range.
pub fn whole_seconds(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if value.is_finite() && (-LIMIT..LIMIT).contains(&value) {
        Some(value as i64)
    } else {
        None
    }
}

/// One sample of a 1 Hz channel stamped with its absolute second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSample {
    pub time: i64,
    pub value: f64,
}

/// A 1 sample-per-second channel (HR or EDA) anchored at `start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSeries {
    /// Timestamp of the first sample, whole seconds
    pub start: i64,
    /// Sampling rate declared by the source header, informational only
    pub fs: f64,
    /// Samples
    pub data: Vec<f64>,
}

impl SignalSeries {
    pub fn new(start: i64, data: Vec<f64>) -> Self {
        Self {
            start,
            fs: 1.0,
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One past the last stamped second, `None` if that overflows `i64`.
    pub fn end(&self) -> Option<i64> {
        i64::try_from(self.data.len())
            .ok()
            .and_then(|len| self.start.checked_add(len))
    }

    /// Value recorded at `time`, if the channel covers that second.
    pub fn value_at(&self, time: i64) -> Option<f64> {
        let offset = time.checked_sub(self.start)?;
        let idx = usize::try_from(offset).ok()?;
        self.data.get(idx).copied()
    }

    pub fn samples(&self) -> impl Iterator<Item = SignalSample> + '_ {
        self.data
            .iter()
            .zip(0i64..)
            .map_while(move |(&value, idx)| {
                self.start
                    .checked_add(idx)
                    .map(|time| SignalSample { time, value })
            })
    }
}

/// A single heartbeat from the IBI channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatEvent {
    /// Seconds since the IBI channel origin
    pub time_offset: f64,
    /// Seconds since the previous beat
    pub inter_beat_interval: f64,
}

impl BeatEvent {
    /// `60 / ibi`, rejecting intervals that would yield inf or NaN.
    pub fn respiration_rate(&self, index: usize) -> Result<f64, PipelineError> {
        let interval = self.inter_beat_interval;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(PipelineError::UndefinedRespiration { index, interval });
        }
        Ok(60.0 / interval)
    }
}

/// Irregularly timed beats plus the start timestamp found in the IBI header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSeries {
    pub start: i64,
    pub events: Vec<BeatEvent>,
}

impl EventSeries {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespirationSample {
    pub time: i64,
    pub rate: f64,
}

/// Per-beat respiration rates, non-decreasing in `time`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RespirationSeries {
    pub samples: Vec<RespirationSample>,
}

impl RespirationSeries {
    /// Stamp every beat at `origin + trunc(time_offset)` and derive its rate.
    pub fn from_events(events: &EventSeries, origin: i64) -> Result<Self, PipelineError> {
        let mut samples: Vec<RespirationSample> = Vec::with_capacity(events.len());
        for (index, beat) in events.events.iter().enumerate() {
            let rate = beat.respiration_rate(index)?;
            let time = whole_seconds(beat.time_offset.trunc())
                .and_then(|offset| origin.checked_add(offset))
                .ok_or(PipelineError::BeatTimeOutOfRange {
                    index,
                    offset: beat.time_offset,
                })?;
            if let Some(prev) = samples.last() {
                if time < prev.time {
                    return Err(PipelineError::UnsortedEvents {
                        index,
                        previous: prev.time,
                        time,
                    });
                }
            }
            samples.push(RespirationSample { time, rate });
        }
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(time_offset: f64, inter_beat_interval: f64) -> BeatEvent {
        BeatEvent {
            time_offset,
            inter_beat_interval,
        }
    }

    #[test]
    fn respiration_rate_from_interval() {
        assert!((beat(0.0, 0.5).respiration_rate(0).unwrap() - 120.0).abs() < 1e-9);
        assert!((beat(0.0, 1.0).respiration_rate(0).unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_or_negative_interval_is_an_error() {
        for ibi in [0.0, -0.4, f64::NAN] {
            let err = beat(3.0, ibi).respiration_rate(4).unwrap_err();
            assert!(matches!(
                err,
                PipelineError::UndefinedRespiration { index: 4, .. }
            ));
        }
    }

    #[test]
    fn offsets_truncate_to_whole_seconds() {
        let events = EventSeries {
            start: 0,
            events: vec![beat(2.9, 1.0), beat(3.4, 0.5)],
        };
        let resp = RespirationSeries::from_events(&events, 1000).unwrap();
        let times: Vec<i64> = resp.samples.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![1002, 1003]);
    }

    #[test]
    fn backwards_beats_are_rejected() {
        let events = EventSeries {
            start: 0,
            events: vec![beat(5.0, 1.0), beat(4.0, 1.0)],
        };
        let err = RespirationSeries::from_events(&events, 0).unwrap_err();
        assert!(matches!(err, PipelineError::UnsortedEvents { index: 1, .. }));
    }

    #[test]
    fn huge_or_non_finite_offsets_are_rejected() {
        for offset in [1e300, f64::INFINITY, f64::NAN] {
            let events = EventSeries {
                start: 0,
                events: vec![beat(1.0, 1.0), beat(offset, 1.0)],
            };
            let err = RespirationSeries::from_events(&events, 1_500_000_000).unwrap_err();
            assert!(matches!(err, PipelineError::BeatTimeOutOfRange { index: 1, .. }));
        }
        // representable offset, but the sum with the origin overflows
        let events = EventSeries {
            start: 0,
            events: vec![beat(9.0e18, 1.0)],
        };
        assert!(matches!(
            RespirationSeries::from_events(&events, 1_000_000_000_000_000_000),
            Err(PipelineError::BeatTimeOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn whole_seconds_bounds() {
        assert_eq!(whole_seconds(1_500_000_000.0), Some(1_500_000_000));
        assert_eq!(whole_seconds(-3.0), Some(-3));
        assert_eq!(whole_seconds(f64::NAN), None);
        assert_eq!(whole_seconds(f64::NEG_INFINITY), None);
        assert_eq!(whole_seconds(9.3e18), None);
    }

    #[test]
    fn value_at_respects_channel_extent() {
        let series = SignalSeries::new(100, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.value_at(99), None);
        assert_eq!(series.value_at(101), Some(2.0));
        assert_eq!(series.value_at(103), None);
        assert_eq!(series.end(), Some(103));
    }

    #[test]
    fn extreme_starts_do_not_overflow() {
        let late = SignalSeries::new(i64::MAX, vec![1.0, 2.0]);
        assert_eq!(late.end(), None);
        assert_eq!(late.value_at(i64::MAX), Some(1.0));
        let early = SignalSeries::new(i64::MIN, vec![1.0]);
        assert_eq!(early.value_at(i64::MAX), None);
    }
}
