use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::dataset::MergedRow;

/// Write rows as CSV with the `HR,Time(sec),EDA,respr,Label,Participant` header.
pub fn write_dataset_to<W: Write>(writer: W, rows: &[MergedRow]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_dataset(path: &Path, rows: &[MergedRow]) -> Result<()> {
    let file =
        fs::File::create(path).with_context(|| format!("creating dataset {}", path.display()))?;
    write_dataset_to(file, rows).with_context(|| format!("writing dataset {}", path.display()))
}

pub fn read_dataset(path: &Path) -> Result<Vec<MergedRow>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening dataset {}", path.display()))?;
    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize::<MergedRow>().enumerate() {
        let row = row.with_context(|| format!("parsing row {} of {}", idx + 1, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}
