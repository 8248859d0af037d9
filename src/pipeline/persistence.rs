// Saving and restoring projects. Two formats:
//   *.json     -> the whole ProjectState via serde (rows, tempo, geometry, volume)
//   otherwise  -> plain lines, a sound path then its 0/1 pattern, one pair per row
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::project::{ProjectRow, ProjectState, bits_to_pattern, pattern_to_bits};

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("cannot read project {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("{path}: sound path without a pattern line")]
    Unpaired { path: String },
}

pub trait Storage {
    fn store(&self, path: &Path, project: &ProjectState) -> anyhow::Result<()>;
    fn restore(&self, path: &Path) -> anyhow::Result<ProjectState>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LineStorage;

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonStorage;

pub fn storage_for(path: &Path) -> Box<dyn Storage> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonStorage)
    } else {
        Box::new(LineStorage)
    }
}

fn read_project(path: &Path) -> Result<String, StorageError> {
    std::fs::read_to_string(path)
        .map_err(|source| StorageError::Unreadable { path: path.to_path_buf(), source })
}

// make the parent directories if they don't exist already
fn write_creating_dirs(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

impl Storage for LineStorage {
    fn store(&self, path: &Path, project: &ProjectState) -> anyhow::Result<()> {
        let mut out = String::new();
        for row in &project.rows {
            out.push_str(&row.sample_path);
            out.push('\n');
            out.push_str(&pattern_to_bits(&row.pattern));
            out.push('\n');
        }
        write_creating_dirs(path, &out)
    }

    fn restore(&self, path: &Path) -> anyhow::Result<ProjectState> {
        let data = read_project(path)?;
        let rows =
            parse_lines(&data).with_context(|| format!("bad project file {}", path.display()))?;
        Ok(ProjectState { rows, settings: None })
    }
}

fn parse_lines(data: &str) -> Result<Vec<ProjectRow>, StorageError> {
    let mut lines: Vec<&str> = data.lines().map(|l| l.trim_end_matches('\r')).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let mut rows = Vec::with_capacity(lines.len() / 2);
    for (pair_idx, pair) in lines.chunks(2).enumerate() {
        let line = pair_idx * 2 + 1; // 1-based, the path line
        let sample_path = pair[0];
        let Some(&bits) = pair.get(1) else {
            return Err(StorageError::Unpaired { path: sample_path.to_string() });
        };
        if sample_path.is_empty() {
            return Err(StorageError::Malformed { line, reason: "empty sound path".into() });
        }
        let pattern = bits_to_pattern(bits).ok_or_else(|| StorageError::Malformed {
            line: line + 1,
            reason: format!("expected only 0 and 1, got {bits:?}"),
        })?;
        rows.push(ProjectRow { sample_path: sample_path.to_string(), pattern });
    }
    Ok(rows)
}

impl Storage for JsonStorage {
    fn store(&self, path: &Path, project: &ProjectState) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(project)?;
        write_creating_dirs(path, &json)
    }

    fn restore(&self, path: &Path) -> anyhow::Result<ProjectState> {
        let data = read_project(path)?;
        serde_json::from_str(&data).with_context(|| format!("bad project file {}", path.display()))
    }
}
