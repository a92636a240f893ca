use std::io::Read;
use std::path::Path;

use crate::error::{Channel, PipelineError};
use crate::io::empatica::open_channel;
use crate::signal::whole_seconds;

/// Parse newline-delimited tag timestamps, ignoring blank/comment lines.
///
/// Fractional tags are rounded up: for whole-second rows, `time >= ceil(tag)`
/// holds exactly when `time >= tag`. The list may be empty; ordering is
/// validated by `BoundaryTagList`.
pub fn parse_tag_series(text: &str, path: &Path) -> Result<Vec<i64>, PipelineError> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let field = trimmed.split(',').next().unwrap_or(trimmed).trim();
        let val: f64 = field.parse().map_err(|_| PipelineError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            message: format!("tag '{}' is not a timestamp", field),
        })?;
        let tag = whole_seconds(val.ceil()).ok_or_else(|| PipelineError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            message: format!("tag {} is not a usable time", field),
        })?;
        out.push(tag);
    }
    Ok(out)
}

/// Read tag timestamps from disk.
pub fn read_tag_series(path: &Path) -> Result<Vec<i64>, PipelineError> {
    let mut text = String::new();
    open_channel(path, Channel::Tags)?
        .read_to_string(&mut text)
        .map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_tag_series(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_and_float_tags() {
        let tags = parse_tag_series("1500000004\n\n1500000007.25\n", Path::new("t.csv")).unwrap();
        assert_eq!(tags, vec![1_500_000_004, 1_500_000_008]);
    }

    #[test]
    fn empty_file_yields_no_tags() {
        assert!(parse_tag_series("\n", Path::new("t.csv")).unwrap().is_empty());
    }

    #[test]
    fn non_finite_tags_are_rejected() {
        for bad in ["nan", "inf", "-inf", "1e30"] {
            let text = format!("1500000001\n{}\n1500000005\n", bad);
            let err = parse_tag_series(&text, Path::new("t.csv")).unwrap_err();
            assert!(matches!(err, PipelineError::Parse { line: 2, .. }), "{bad}");
        }
    }

    #[test]
    fn garbage_reports_line_number() {
        let err = parse_tag_series("10\nstart\n", Path::new("t.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { line: 2, .. }));
    }
}
