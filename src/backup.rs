use serde::{Deserialize, Serialize};

use crate::{Currency, DividendEntry, Source};

/// On-disk form of one dividend entry. Field names are the backup format
/// contract, so renames here break old backups.
#[derive(Debug, Serialize, Deserialize)]
struct BackupRecord {
    country: String,
    amount: f64,
    currency: String,
    tax_rate_percent: f64,
    source: String,
}

impl BackupRecord {
    fn from_entry(entry: &DividendEntry) -> BackupRecord {
        BackupRecord {
            country: entry.country.clone(),
            amount: entry.amount.value(),
            currency: entry.amount.code().to_owned(),
            tax_rate_percent: entry.tax_rate_percent,
            source: entry.source.as_str().to_owned(),
        }
    }

    fn into_entry(self) -> Result<DividendEntry, String> {
        Ok(DividendEntry {
            country: self.country,
            amount: Currency::from_code(&self.currency, self.amount)?,
            tax_rate_percent: self.tax_rate_percent,
            source: Source::from_str(&self.source)?,
        })
    }
}

fn records_to_entries(records: Vec<BackupRecord>) -> Result<Vec<DividendEntry>, String> {
    // Fully parse into a fresh Vec; the caller's ledger is only touched once
    // everything converted
    records
        .into_iter()
        .map(|record| record.into_entry())
        .collect()
}

/// Reads a backup file, format picked by extension (.json or .csv). Entry
/// order is the file order.
pub fn load_backup(path: &str) -> Result<Vec<DividendEntry>, String> {
    if path.ends_with(".json") {
        load_json_backup(path)
    } else if path.ends_with(".csv") {
        load_csv_backup(path)
    } else {
        Err(format!("Error: unsupported backup format: {path}"))
    }
}

/// Writes all entries out, format picked by extension (.json or .csv).
pub fn save_backup(path: &str, entries: &[DividendEntry]) -> Result<(), String> {
    if path.ends_with(".json") {
        save_json_backup(path, entries)
    } else if path.ends_with(".csv") {
        save_csv_backup(path, entries)
    } else {
        Err(format!("Error: unsupported backup format: {path}"))
    }
}

fn load_json_backup(path: &str) -> Result<Vec<DividendEntry>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|_| format!("Error: unable to open backup file: {path}"))?;
    let records: Vec<BackupRecord> = serde_json::from_str(&content)
        .map_err(|e| format!("Error: unable to parse backup file {path}: {e}"))?;
    records_to_entries(records)
}

fn save_json_backup(path: &str, entries: &[DividendEntry]) -> Result<(), String> {
    let records: Vec<BackupRecord> = entries.iter().map(BackupRecord::from_entry).collect();
    let content = serde_json::to_string_pretty(&records)
        .map_err(|e| format!("Error: unable to serialize backup: {e}"))?;
    std::fs::write(path, content)
        .map_err(|_| format!("Error: unable to write backup file: {path}"))
}

fn load_csv_backup(path: &str) -> Result<Vec<DividendEntry>, String> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|_| format!("Error: unable to open backup file: {path}"))?;
    let records: Vec<BackupRecord> = reader
        .deserialize()
        .collect::<Result<_, _>>()
        .map_err(|e| format!("Error: unable to parse backup file {path}: {e}"))?;
    records_to_entries(records)
}

fn save_csv_backup(path: &str, entries: &[DividendEntry]) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|_| format!("Error: unable to write backup file: {path}"))?;
    entries.iter().try_for_each(|entry| {
        writer
            .serialize(BackupRecord::from_entry(entry))
            .map_err(|e| format!("Error: unable to serialize backup: {e}"))
    })?;
    writer
        .flush()
        .map_err(|_| format!("Error: unable to write backup file: {path}"))
}
