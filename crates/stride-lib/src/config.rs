use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File names looked up inside each subject folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelFiles {
    pub hr: String,
    pub eda: String,
    pub ibi: String,
    /// Tags file is `<tags_prefix><folder name>.csv`
    pub tags_prefix: String,
}

impl Default for ChannelFiles {
    fn default() -> Self {
        Self {
            hr: "HR.csv".into(),
            eda: "EDA.csv".into(),
            ibi: "IBI.csv".into(),
            tags_prefix: "tags_".into(),
        }
    }
}

impl ChannelFiles {
    pub fn tags_file(&self, subject: &str) -> String {
        format!("{}{}.csv", self.tags_prefix, subject)
    }
}

/// Origin added to IBI time offsets before the nearest-time join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IbiTimeBase {
    /// Start timestamp from the IBI file header
    #[default]
    ChannelStart,
    /// Start timestamp of the HR channel
    HrStart,
    /// Offsets are used as-is
    Raw,
}

impl IbiTimeBase {
    pub fn origin(&self, hr_start: i64, ibi_start: i64) -> i64 {
        match self {
            IbiTimeBase::ChannelStart => ibi_start,
            IbiTimeBase::HrStart => hr_start,
            IbiTimeBase::Raw => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub files: ChannelFiles,
    pub ibi_time_base: IbiTimeBase,
    /// Label subjects with an empty tags file as baseline instead of failing
    pub allow_untagged: bool,
}

pub fn read_config(path: &Path) -> Result<PipelineConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: PipelineConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}
