use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::error::Error;
use std::path::{Path, PathBuf};
use stride_lib::io::dataset::read_dataset;
use tempfile::tempdir;

fn build_cohort(out: &Path) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join("test_data");
    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args([
        "cohort",
        "--root",
        root.to_str().expect("utf8 path"),
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();
}

#[test]
fn split_holds_out_every_participant() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let data = dir.path().join("processed_data.csv");
    let train = dir.path().join("train.csv");
    let test = dir.path().join("test.csv");
    build_cohort(&data);

    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args([
        "split",
        "--input",
        data.to_str().expect("utf8 path"),
        "--train",
        train.to_str().expect("utf8 path"),
        "--test",
        test.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();

    let train_rows = read_dataset(&train)?;
    let test_rows = read_dataset(&test)?;
    assert_eq!(train_rows.len() + test_rows.len(), 12);
    assert_eq!(test_rows.iter().filter(|r| r.subject_id == 1).count(), 1);
    assert_eq!(test_rows.iter().filter(|r| r.subject_id == 2).count(), 1);
    Ok(())
}

#[test]
fn summary_reports_label_counts() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let data = dir.path().join("processed_data.csv");
    build_cohort(&data);

    let mut cmd = cargo_bin_cmd!("stride");
    cmd.args(["summary", "--input", data.to_str().expect("utf8 path")]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let value: Value = serde_json::from_slice(&out)?;
    assert_eq!(value["total"]["rows"], 12);
    assert_eq!(value["total"]["stressed"], 6);
    assert_eq!(value["total"]["missing_respr"], 0);
    assert_eq!(value["participants"]["2"]["stressed"], 3);
    Ok(())
}
