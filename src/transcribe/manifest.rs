use anyhow::{bail, Context};
use std::fs;
use std::path::{Path, PathBuf};

/// One line of a `.list` manifest: `path|label|LANG|text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: String,
    pub label: String,
    pub language: String,
    pub text: String,
}

impl ManifestEntry {
    pub fn to_line(&self) -> String {
        format!("{}|{}|{}|{}", self.path, self.label, self.language, self.text)
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, '|');
        let path = parts.next()?.trim();
        let label = parts.next()?;
        let language = parts.next()?;
        let text = parts.next()?;

        if path.is_empty() {
            return None;
        }

        Some(Self {
            path: path.to_string(),
            label: label.to_string(),
            language: language.to_string(),
            text: text.trim_end_matches(['\r', '\n']).to_string(),
        })
    }
}

pub fn write_manifest(output_dir: &Path, name: &str, entries: &[ManifestEntry]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create manifest dir {}", output_dir.display()))?;
    let dir = std::path::absolute(output_dir)
        .with_context(|| format!("resolve manifest dir {}", output_dir.display()))?;
    let path = dir.join(format!("{name}.list"));

    let body = entries
        .iter()
        .map(ManifestEntry::to_line)
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&path, body).with_context(|| format!("write manifest {}", path.display()))?;

    Ok(path)
}

pub fn read_manifest(path: &Path) -> anyhow::Result<Vec<ManifestEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read manifest {}", path.display()))?;

    let mut entries = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match ManifestEntry::parse_line(line) {
            Some(entry) => entries.push(entry),
            None => bail!("malformed manifest line {} in {}", index + 1, path.display()),
        }
    }

    Ok(entries)
}
