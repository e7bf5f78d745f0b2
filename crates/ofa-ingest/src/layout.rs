//! Date-partitioned directory layout shared by extracts and enriched datasets.
//!
//! Extracts live under `<root>/<location>-cleaned/<YYYY>/<MM>/<DD>/`, enriched
//! datasets under `<root>/<YYYY>/<MM>/<DD>/`. When a partition holds several
//! files the lexicographically last one is the current one.

use std::path::{Path, PathBuf};

use ofa_model::Period;

use crate::error::{IngestError, Result};

/// `<root>/<YYYY>/<MM>`.
pub fn month_dir(root: &Path, period: Period) -> PathBuf {
    root.join(format!("{:04}", period.year()))
        .join(format!("{:02}", period.month()))
}

/// `<root>/<YYYY>/<MM>/<DD>`.
pub fn day_dir(root: &Path, period: Period) -> PathBuf {
    month_dir(root, period).join(format!("{:02}", period.day()))
}

/// `<root>/<location>-cleaned/<YYYY>/<MM>/<DD>`.
pub fn extract_dir(root: &Path, location: &str, period: Period) -> PathBuf {
    day_dir(&root.join(format!("{location}-cleaned")), period)
}

/// Lists the CSV files of a directory, sorted by file name.
///
/// A missing directory has no files.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// The last CSV of a directory, if any.
pub fn latest_csv(dir: &Path) -> Result<Option<PathBuf>> {
    Ok(list_csv_files(dir)?.pop())
}

/// The last CSV across the day partitions of a month.
///
/// Later days win; within a day the last file name wins.
pub fn latest_csv_in_month(root: &Path, period: Period) -> Result<Option<PathBuf>> {
    let month = month_dir(root, period);
    if !month.is_dir() {
        return Ok(None);
    }

    let entries = std::fs::read_dir(&month).map_err(|e| IngestError::DirectoryRead {
        path: month.clone(),
        source: e,
    })?;
    let mut days = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::DirectoryRead {
            path: month.clone(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            days.push(path);
        }
    }
    days.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    for day in days.iter().rev() {
        if let Some(path) = latest_csv(day)? {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn period(value: &str) -> Period {
        Period::parse(value).unwrap()
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "a\n1\n").unwrap();
    }

    #[test]
    fn partition_paths_are_zero_padded() {
        let root = Path::new("/data");
        assert_eq!(
            extract_dir(root, "caparc", period("2023-03-06")),
            PathBuf::from("/data/caparc-cleaned/2023/03/06")
        );
        assert_eq!(
            day_dir(root, period("2024-11-20")),
            PathBuf::from("/data/2024/11/20")
        );
    }

    #[test]
    fn latest_csv_picks_last_name_and_skips_other_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("extract_0900.csv"));
        touch(&dir.path().join("extract_1400.CSV"));
        touch(&dir.path().join("notes.txt"));

        let latest = latest_csv(dir.path()).unwrap().unwrap();
        assert_eq!(latest.file_name().unwrap(), "extract_1400.CSV");
        assert_eq!(list_csv_files(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn missing_directory_has_no_files() {
        let dir = TempDir::new().unwrap();
        assert!(latest_csv(&dir.path().join("absent")).unwrap().is_none());
        assert!(
            latest_csv_in_month(dir.path(), period("2023-02-06"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn latest_in_month_prefers_later_day() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("2023/02/06/oneforall_2023-02-06.csv"));
        touch(&dir.path().join("2023/02/20/oneforall_2023-02-20.csv"));
        std::fs::create_dir_all(dir.path().join("2023/02/27")).unwrap();

        let latest = latest_csv_in_month(dir.path(), period("2023-02-01"))
            .unwrap()
            .unwrap();
        assert_eq!(latest.file_name().unwrap(), "oneforall_2023-02-20.csv");
    }
}
