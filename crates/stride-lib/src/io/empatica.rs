use csv::{ReaderBuilder, StringRecord, Trim};
use log::warn;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Channel, PipelineError};
use crate::signal::{whole_seconds, BeatEvent, EventSeries, SignalSeries};

/// Open a channel file; any failure to open it means the channel is missing.
pub(crate) fn open_channel(path: &Path, channel: Channel) -> Result<File, PipelineError> {
    File::open(path).map_err(|source| PipelineError::MissingChannel {
        channel,
        path: path.to_path_buf(),
        source,
    })
}

/// Load an E4-style 1 Hz export: start timestamp line, sample rate line, then samples.
pub fn read_signal_channel(path: &Path, channel: Channel) -> Result<SignalSeries, PipelineError> {
    let file = open_channel(path, channel)?;
    parse_signal_channel(file, path)
}

/// Parse an E4-style export; `path` is used for error messages only.
pub fn parse_signal_channel<R: Read>(reader: R, path: &Path) -> Result<SignalSeries, PipelineError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut start = None;
    let mut fs = 1.0;
    let mut data = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| PipelineError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        match idx {
            0 => start = Some(parse_timestamp(&record, path)?),
            1 => fs = parse_field(&record, 0, path)?,
            _ => data.push(parse_field(&record, 0, path)?),
        }
    }
    let start = start.ok_or_else(|| PipelineError::Parse {
        path: path.to_path_buf(),
        line: 1,
        message: "missing start timestamp".into(),
    })?;
    if (fs - 1.0).abs() > f64::EPSILON {
        warn!(
            "{} declares {} Hz; samples are treated as one per second",
            path.display(),
            fs
        );
    }
    Ok(SignalSeries { start, fs, data })
}

/// Load an IBI export: `<start>, IBI` header followed by `offset, interval` rows.
pub fn read_ibi_channel(path: &Path) -> Result<EventSeries, PipelineError> {
    let file = open_channel(path, Channel::Ibi)?;
    parse_ibi_channel(file, path)
}

pub fn parse_ibi_channel<R: Read>(reader: R, path: &Path) -> Result<EventSeries, PipelineError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let csv_err = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let headers = reader.headers().map_err(csv_err)?.clone();
    if headers.get(0).map_or(true, str::is_empty) {
        warn!("{} is empty; no beats", path.display());
        return Ok(EventSeries::default());
    }
    let start = parse_timestamp(&headers, path)?;
    let mut events = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        events.push(BeatEvent {
            time_offset: parse_field(&record, 0, path)?,
            inter_beat_interval: parse_field(&record, 1, path)?,
        });
    }
    Ok(EventSeries { start, events })
}

/// First field as whole seconds, truncated; NaN, inf and out-of-range values are rejected.
fn parse_timestamp(record: &StringRecord, path: &Path) -> Result<i64, PipelineError> {
    let value = parse_field(record, 0, path)?;
    whole_seconds(value.trunc()).ok_or_else(|| PipelineError::Parse {
        path: path.to_path_buf(),
        line: record.position().map_or(0, |pos| pos.line() as usize),
        message: format!("start timestamp {} is not a usable time", value),
    })
}

fn parse_field(record: &StringRecord, column: usize, path: &Path) -> Result<f64, PipelineError> {
    let line = record.position().map_or(0, |pos| pos.line() as usize);
    let raw = record.get(column).ok_or_else(|| PipelineError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("missing column {}", column + 1),
    })?;
    raw.parse::<f64>().map_err(|_| PipelineError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("'{}' is not a number", raw),
    })
}
