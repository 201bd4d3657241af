use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::info;

/// Read a snapshot file: a JSON array of user or tweet records.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open snapshot {}", path.display()))?;
    let records: Vec<T> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Write records as a JSON array indented with four spaces.
pub fn save<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = fs::File::create(path)
        .with_context(|| format!("failed to create snapshot {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records
        .serialize(&mut ser)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Decide where a fetched snapshot goes.
///
/// With no `output` the file lands in `cwd`. An `output` that is an existing
/// directory, or that ends in a path separator, gets `file_name` appended;
/// anything else is used as the file path itself.
pub fn resolve_output(file_name: &str, output: Option<&Path>, cwd: &Path) -> PathBuf {
    match output {
        None => cwd.join(file_name),
        Some(path) => {
            let names_dir = path.is_dir()
                || path.to_string_lossy().ends_with(MAIN_SEPARATOR)
                || path.to_string_lossy().ends_with('/');
            if names_dir {
                path.join(file_name)
            } else {
                path.to_path_buf()
            }
        }
    }
}
