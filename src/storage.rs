use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::records::{Journal, JournalHeader};

const RECORDS_MARKER: &str = "\n=== RECORDS ===\n";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    TomlDecode(toml::de::Error),
    TomlEncode(toml::ser::Error),
    JsonDecode(serde_json::Error),
    JsonEncode(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::TomlDecode(err) => write!(f, "failed to parse TOML header: {err}"),
            StorageError::TomlEncode(err) => write!(f, "failed to encode TOML header: {err}"),
            StorageError::JsonDecode(err) => write!(f, "failed to parse JSONL record: {err}"),
            StorageError::JsonEncode(err) => write!(f, "failed to encode JSONL record: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

pub fn load_journal(path: &Path) -> Result<Journal, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Journal::new()),
        Err(err) => return Err(StorageError::Io(err)),
    };

    if raw.trim().is_empty() {
        return Ok(Journal::new());
    }

    let (header_blob, records_blob) = if let Some((header, records)) = raw.split_once(RECORDS_MARKER)
    {
        (header, records)
    } else {
        (raw.as_str(), "")
    };

    let header: JournalHeader = toml::from_str(header_blob).map_err(StorageError::TomlDecode)?;
    let mut records = Vec::new();
    for line in records_blob.lines() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(line).map_err(StorageError::JsonDecode)?);
    }

    Ok(Journal { header, records })
}

pub fn save_journal(path: &Path, journal: &Journal) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
    }

    let header = toml::to_string_pretty(&journal.header).map_err(StorageError::TomlEncode)?;
    let mut file = fs::File::create(path).map_err(StorageError::Io)?;
    file.write_all(header.as_bytes())
        .map_err(StorageError::Io)?;
    file.write_all(RECORDS_MARKER.as_bytes())
        .map_err(StorageError::Io)?;

    for record in &journal.records {
        let line = serde_json::to_string(record).map_err(StorageError::JsonEncode)?;
        file.write_all(line.as_bytes()).map_err(StorageError::Io)?;
        file.write_all(b"\n").map_err(StorageError::Io)?;
    }

    Ok(())
}
