use serde::{Deserialize, Serialize};

/// One aligned, labeled second of one subject's recording.
///
/// Field order and renames define the exported column layout
/// `HR,Time(sec),EDA,respr,Label,Participant` consumed by model training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    #[serde(rename = "HR")]
    pub hr: f64,
    #[serde(rename = "Time(sec)")]
    pub time: i64,
    #[serde(rename = "EDA")]
    pub eda: f64,
    /// Absent only when the subject has no beats at all
    pub respr: Option<f64>,
    #[serde(rename = "Label")]
    pub label: u8,
    #[serde(rename = "Participant")]
    pub subject_id: u32,
}

impl MergedRow {
    pub fn is_stressed(&self) -> bool {
        self.label == 1
    }
}

/// Rows for a single subject, ordered by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDataset {
    /// Folder name the subject was read from
    pub subject: String,
    pub subject_id: u32,
    pub rows: Vec<MergedRow>,
}

impl SubjectDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Subject datasets concatenated in processing order; never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortDataset {
    pub rows: Vec<MergedRow>,
}

impl CohortDataset {
    pub fn append(&mut self, subject: SubjectDataset) {
        self.rows.extend(subject.rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<SubjectDataset> for CohortDataset {
    fn from_iter<I: IntoIterator<Item = SubjectDataset>>(iter: I) -> Self {
        let mut cohort = CohortDataset::default();
        for subject in iter {
            cohort.append(subject);
        }
        cohort
    }
}
