use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use super::{Record, Table, COL_ABSTRACT, COL_AUTHOR, COL_ID, COL_LINK, COL_TITLE, COL_TRACK};

/// File names tried, in order, when the data path is a directory.
const KNOWN_FILES: &[&str] = &[
    "2025 ESMO - All combined - raw.csv",
    "2025 ESMO Abstracts.csv",
    "ESMO_Abstracts.csv",
    "2025 ASCO - Abstracts.csv",
    "2025 ASCO Abstracts.csv",
    "ASCO_Abstracts.csv",
    "abstracts.csv",
];

/// ESMO exports use different headers than ASCO ones; everything is mapped to the ASCO names.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("Poster ID", COL_ID),
    ("Poster Title", COL_TITLE),
    ("Presenting Author", COL_AUTHOR),
    ("Category", COL_TRACK),
];

/// Find the spreadsheet export to load. A file path is used as is.
pub fn resolve_data_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        anyhow::bail!("Data path {} does not exist", path.display());
    }

    for name in KNOWN_FILES {
        let candidate = path.join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    let mut csv_files: Vec<PathBuf> = fs::read_dir(path)
        .with_context(|| format!("Failed to list {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    csv_files.sort();

    csv_files
        .into_iter()
        .next()
        .with_context(|| format!("No abstracts CSV file found in {}", path.display()))
}

/// Resolve and load the abstracts table.
pub fn load(path: &Path) -> Result<(PathBuf, Table)> {
    let file_path = resolve_data_file(path)?;
    let file = fs::File::open(&file_path)
        .with_context(|| format!("Failed to open {}", file_path.display()))?;
    let table = load_from_reader(file)
        .with_context(|| format!("Failed to load abstracts from {}", file_path.display()))?;
    Ok((file_path, table))
}

/// Parse a CSV export into a table, normalizing column names.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Table> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut columns: Vec<String> = reader
        .headers()
        .context("Missing header row")?
        .iter()
        .map(normalize_column)
        .collect();
    let has_link = columns.iter().any(|c| c == COL_LINK);

    let mut records = Vec::new();
    for (row_number, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("Invalid row {}", row_number + 1))?;
        let mut record = Record::default();

        for (i, column) in columns.iter().enumerate() {
            // Short rows are padded with empty cells.
            let value = row.get(i).unwrap_or_default().to_string();
            match column.as_str() {
                COL_ID => record.id = value,
                COL_TRACK => record.track = value,
                COL_AUTHOR => record.author = value,
                COL_TITLE => record.title = value,
                COL_ABSTRACT => record.abstract_text = value,
                _ => record.extra.push((column.clone(), value)),
            }
        }
        if !has_link {
            record.extra.push((COL_LINK.to_string(), String::new()));
        }
        records.push(record);
    }

    if !has_link {
        columns.push(COL_LINK.to_string());
    }

    Ok(Table::new(records, columns))
}

fn normalize_column(raw: &str) -> String {
    let name = raw.trim();
    COLUMN_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| name.to_string())
}
