use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    align::align,
    config::PipelineConfig,
    dataset::{CohortDataset, MergedRow, SubjectDataset},
    error::{Channel, PipelineError, SubjectError},
    io::{empatica, text},
    label::{apply_labels, clear_labels, BoundaryTagList},
    signal::{EventSeries, RespirationSeries, SignalSeries},
    timeline::build_timeline,
};

/// Raw channels of one subject, as read from its folder.
#[derive(Debug, Clone)]
pub struct SubjectRecording {
    pub hr: SignalSeries,
    pub eda: SignalSeries,
    pub ibi: EventSeries,
    pub tags: Vec<i64>,
}

/// Subject id from the integer suffix of a folder name (`S07` -> 7).
pub fn parse_subject_id(name: &str) -> Result<u32, PipelineError> {
    let prefix_len = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    name[prefix_len..]
        .parse::<u32>()
        .map_err(|_| PipelineError::InvalidSubjectId { name: name.into() })
}

/// Timeline, alignment and labeling for one subject's channels.
pub fn merge_recording(
    recording: &SubjectRecording,
    subject_id: u32,
    config: &PipelineConfig,
) -> Result<Vec<MergedRow>, PipelineError> {
    let SubjectRecording { hr, eda, ibi, tags } = recording;
    if hr.is_empty() {
        return Err(PipelineError::EmptyChannel {
            channel: Channel::Hr,
        });
    }
    let grid = build_timeline(hr.start, hr.len())?;
    let origin = config.ibi_time_base.origin(hr.start, ibi.start);
    let resp = RespirationSeries::from_events(ibi, origin)?;
    if eda.is_empty() {
        warn!("subject {} has an empty EDA channel", subject_id);
    }

    let mut rows = align(&grid, hr, eda, &resp);
    match BoundaryTagList::new(tags.clone()) {
        Ok(boundaries) => apply_labels(&mut rows, &boundaries),
        Err(PipelineError::EmptyBoundaryList) if config.allow_untagged => {
            warn!("subject {} has no boundary tags; every row is baseline", subject_id);
            clear_labels(&mut rows);
        }
        Err(err) => return Err(err),
    }
    for row in rows.iter_mut() {
        row.subject_id = subject_id;
    }
    Ok(rows)
}

/// Builds one subject's dataset from its folder.
#[derive(Debug, Clone, Default)]
pub struct SubjectPipeline {
    config: PipelineConfig,
}

impl SubjectPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, folder: &Path) -> Result<SubjectDataset, SubjectError> {
        let subject = folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| folder.display().to_string());
        info!("processing subject {}", subject);
        self.build(folder, &subject)
            .map_err(|source| SubjectError::new(subject.clone(), source))
    }

    fn build(&self, folder: &Path, subject: &str) -> Result<SubjectDataset, PipelineError> {
        let subject_id = parse_subject_id(subject)?;
        let recording = self.load(folder, subject)?;
        let rows = merge_recording(&recording, subject_id, &self.config)?;
        info!(
            "subject {}: {} rows from {} HR seconds",
            subject,
            rows.len(),
            recording.hr.len()
        );
        Ok(SubjectDataset {
            subject: subject.to_string(),
            subject_id,
            rows,
        })
    }

    pub fn load(&self, folder: &Path, subject: &str) -> Result<SubjectRecording, PipelineError> {
        let files = &self.config.files;
        let hr = empatica::read_signal_channel(&folder.join(&files.hr), Channel::Hr)?;
        let eda = empatica::read_signal_channel(&folder.join(&files.eda), Channel::Eda)?;
        let ibi = match empatica::read_ibi_channel(&folder.join(&files.ibi)) {
            Ok(ibi) => ibi,
            Err(PipelineError::MissingChannel { path, source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!("{} not found; respiration left empty", path.display());
                EventSeries {
                    start: hr.start,
                    events: Vec::new(),
                }
            }
            Err(err) => return Err(err),
        };
        let tags = text::read_tag_series(&folder.join(files.tags_file(subject)))?;
        Ok(SubjectRecording { hr, eda, ibi, tags })
    }
}

/// What to do when a subject fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing subject in input order
    #[default]
    FailFast,
    /// Skip failing subjects and report them
    KeepGoing,
}

/// Outcome of a cohort run.
#[derive(Debug, Default)]
pub struct CohortReport {
    pub dataset: CohortDataset,
    /// Subjects whose rows are in `dataset`, in input order
    pub succeeded: Vec<String>,
    pub failed: Vec<SubjectError>,
}

/// Runs [`SubjectPipeline`] over an explicit subject list and concatenates the results.
#[derive(Debug, Clone)]
pub struct CohortAssembler {
    pipeline: SubjectPipeline,
    jobs: usize,
    policy: FailurePolicy,
}

impl CohortAssembler {
    pub fn new(pipeline: SubjectPipeline) -> Self {
        Self {
            pipeline,
            jobs: 1,
            policy: FailurePolicy::default(),
        }
    }

    /// Number of worker threads; 0 and 1 both mean sequential.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Process `subjects` and concatenate their rows in the given order.
    pub fn assemble(&self, subjects: &[PathBuf]) -> Result<CohortReport, SubjectError> {
        let mut report = CohortReport::default();
        for result in self.run_all(subjects) {
            match result {
                Ok(subject) => {
                    report.succeeded.push(subject.subject.clone());
                    report.dataset.append(subject);
                }
                Err(err) => match self.policy {
                    FailurePolicy::FailFast => return Err(err),
                    FailurePolicy::KeepGoing => {
                        warn!("{}", err);
                        report.failed.push(err);
                    }
                },
            }
        }
        info!(
            "cohort: {} rows from {} subjects ({} failed)",
            report.dataset.len(),
            report.succeeded.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// One result per subject, indexed like `subjects`.
    ///
    /// Worker runs collect through an indexed parallel iterator, so the
    /// order never depends on which subject finishes first.
    fn run_all(&self, subjects: &[PathBuf]) -> Vec<Result<SubjectDataset, SubjectError>> {
        if self.jobs <= 1 || subjects.len() <= 1 {
            let mut results = Vec::with_capacity(subjects.len());
            for folder in subjects {
                let result = self.pipeline.run(folder);
                let failed = result.is_err();
                results.push(result);
                if failed && self.policy == FailurePolicy::FailFast {
                    break;
                }
            }
            return results;
        }
        let pool = match ThreadPoolBuilder::new().num_threads(self.jobs).build() {
            Ok(pool) => pool,
            Err(err) => {
                warn!("cannot start {} workers ({}); running sequentially", self.jobs, err);
                return subjects.iter().map(|folder| self.pipeline.run(folder)).collect();
            }
        };
        pool.install(|| {
            subjects
                .par_iter()
                .map(|folder| self.pipeline.run(folder))
                .collect()
        })
    }
}

/// Subject folders under `root`, ordered by subject id then name.
///
/// Entries without an integer suffix are skipped.
pub fn discover_subjects(root: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: root.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in fs::read_dir(root).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match parse_subject_id(&name) {
            Ok(id) => found.push((id, name, entry.path())),
            Err(_) => debug!("skipping {}: no subject id", name),
        }
    }
    found.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    Ok(found.into_iter().map(|(_, _, path)| path).collect())
}
