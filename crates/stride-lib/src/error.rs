use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Input streams a subject folder is expected to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Hr,
    Eda,
    Ibi,
    Tags,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Hr => "HR",
            Channel::Eda => "EDA",
            Channel::Ibi => "IBI",
            Channel::Tags => "tags",
        };
        f.write_str(name)
    }
}

/// Data-integrity failures detected while building one subject's dataset.
///
/// None of these are transient: the source files must be fixed and the run repeated.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{channel} channel missing or unreadable: {path}")]
    MissingChannel {
        channel: Channel,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{channel} channel has no samples")]
    EmptyChannel { channel: Channel },
    #[error("timeline length must be at least 1, got {length}")]
    InvalidLength { length: usize },
    #[error("boundary tags must be strictly increasing: tag {current} at position {index} follows {previous}")]
    UnsortedBoundary {
        index: usize,
        previous: i64,
        current: i64,
    },
    #[error("boundary tag list is empty")]
    EmptyBoundaryList,
    #[error("cannot derive a subject id from '{name}'")]
    InvalidSubjectId { name: String },
    #[error("inter-beat interval {interval} at beat {index} is not positive")]
    UndefinedRespiration { index: usize, interval: f64 },
    #[error("beat {index} has time offset {offset}, outside the representable timeline")]
    BeatTimeOutOfRange { index: usize, offset: f64 },
    #[error("timeline starting at {start} with {length} seconds overflows")]
    TimelineOverflow { start: i64, length: usize },
    #[error("beat {index} at {time}s precedes the previous beat at {previous}s")]
    UnsortedEvents { index: usize, previous: i64, time: i64 },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{path}, line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// A pipeline failure attributed to the subject that produced it.
#[derive(Debug, Error)]
#[error("subject {subject}: {source}")]
pub struct SubjectError {
    pub subject: String,
    #[source]
    pub source: PipelineError,
}

impl SubjectError {
    pub fn new(subject: impl Into<String>, source: PipelineError) -> Self {
        Self {
            subject: subject.into(),
            source,
        }
    }
}
