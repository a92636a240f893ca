use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::{
    io,
    path::{Path, PathBuf},
};
use stride_lib::{
    config::{read_config, PipelineConfig},
    io::dataset::{read_dataset, write_dataset, write_dataset_to},
    pipeline::{discover_subjects, CohortAssembler, FailurePolicy, SubjectPipeline},
    split::stratified_split,
    summary::summarize,
    MergedRow,
};

#[derive(Parser)]
#[command(
    name = "stride",
    version,
    about = "STRIDE: aligned, labeled stress datasets from wearable exports"
)]
struct Cli {
    /// Pipeline configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align and label one subject folder
    Subject {
        dir: PathBuf,
        /// Write CSV here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Process every subject and concatenate the results
    Cohort {
        /// Folder holding one subdirectory per subject
        #[arg(long, conflicts_with = "subject")]
        root: Option<PathBuf>,
        /// Explicit subject folders, processed in the order given
        #[arg(long)]
        subject: Vec<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 1)]
        jobs: usize,
        /// Skip failing subjects instead of aborting
        #[arg(long)]
        keep_going: bool,
    },
    /// Participant-stratified train/test split of a processed dataset
    Split {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        train: PathBuf,
        #[arg(long)]
        test: PathBuf,
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Label distribution of a processed dataset as JSON
    Summary {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Subject { dir, out } => cmd_subject(config, &dir, out.as_deref())?,
        Commands::Cohort {
            root,
            subject,
            out,
            jobs,
            keep_going,
        } => cmd_cohort(config, root.as_deref(), subject, &out, jobs, keep_going)?,
        Commands::Split {
            input,
            train,
            test,
            test_size,
            seed,
        } => cmd_split(&input, &train, &test, test_size, seed)?,
        Commands::Summary { input } => cmd_summary(&input)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => read_config(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn write_rows(out: Option<&Path>, rows: &[MergedRow]) -> Result<()> {
    match out {
        Some(path) => write_dataset(path, rows),
        None => write_dataset_to(io::stdout().lock(), rows),
    }
}

fn cmd_subject(config: PipelineConfig, dir: &Path, out: Option<&Path>) -> Result<()> {
    let dataset = SubjectPipeline::new(config).run(dir)?;
    write_rows(out, &dataset.rows)
}

fn cmd_cohort(
    config: PipelineConfig,
    root: Option<&Path>,
    subjects: Vec<PathBuf>,
    out: &Path,
    jobs: usize,
    keep_going: bool,
) -> Result<()> {
    let subjects = match root {
        Some(root) => discover_subjects(root)
            .with_context(|| format!("listing subjects in {}", root.display()))?,
        None => subjects,
    };
    if subjects.is_empty() {
        bail!("no subjects to process; pass --root or --subject");
    }
    let policy = if keep_going {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::FailFast
    };
    let report = CohortAssembler::new(SubjectPipeline::new(config))
        .with_jobs(jobs)
        .with_policy(policy)
        .assemble(&subjects)?;
    write_dataset(out, &report.dataset.rows)?;
    info!("processed data saved to {}", out.display());
    for failure in &report.failed {
        eprintln!("skipped {}", failure);
    }
    Ok(())
}

fn cmd_split(input: &Path, train: &Path, test: &Path, test_size: f64, seed: u64) -> Result<()> {
    let rows = read_dataset(input)?;
    let split = stratified_split(&rows, test_size, seed)?;
    write_dataset(train, &split.train)?;
    write_dataset(test, &split.test)?;
    info!(
        "split {} rows into {} train / {} test",
        rows.len(),
        split.train.len(),
        split.test.len()
    );
    Ok(())
}

fn cmd_summary(input: &Path) -> Result<()> {
    let rows = read_dataset(input)?;
    let summary = summarize(&rows);
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
