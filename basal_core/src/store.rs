//! CSV-backed storage for daily entries.
//!
//! The analysis engine never touches storage; this is the caller-side layer
//! the CLI uses. A data directory holds:
//! - `temperatures.csv`: `date,temperature,notes,cervical_mucus`
//! - `periods.csv`: `date,flow_intensity`
//!
//! Reads take a shared lock and writes an exclusive lock on a lock file in
//! the same directory. Writes go to a temp file that is renamed over the
//! original, so a crash never leaves a half-written CSV behind.

use crate::{CervicalMucus, Error, FlowEntry, FlowIntensity, Result, TemperatureReading};
use chrono::NaiveDate;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use csv::ByteRecord;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const TEMPERATURES_FILE: &str = "temperatures.csv";
pub const PERIODS_FILE: &str = "periods.csv";
const LOCK_FILE: &str = ".basal.lock";

const TEMPERATURE_HEADER: &[&str] = &["date", "temperature", "notes", "cervical_mucus"];
const FLOW_HEADER: &[&str] = &["date", "flow_intensity"];

/// Plausible waking temperature range in °C
pub const MIN_TEMPERATURE: f64 = 34.0;
pub const MAX_TEMPERATURE: f64 = 42.0;

/// CSV row format for temperature readings
#[derive(Debug, Serialize, Deserialize)]
struct TemperatureRow {
    date: NaiveDate,
    temperature: f64,
    notes: Option<String>,
    cervical_mucus: Option<CervicalMucus>,
}

impl TryFrom<TemperatureRow> for TemperatureReading {
    type Error = Error;

    fn try_from(row: TemperatureRow) -> Result<Self> {
        validate_temperature(row.temperature)?;
        Ok(TemperatureReading {
            date: row.date,
            temperature: row.temperature,
            notes: row.notes.filter(|n| !n.is_empty()),
            cervical_mucus: row.cervical_mucus,
        })
    }
}

impl From<&TemperatureReading> for TemperatureRow {
    fn from(reading: &TemperatureReading) -> Self {
        TemperatureRow {
            date: reading.date,
            temperature: reading.temperature,
            notes: reading.notes.clone(),
            cervical_mucus: reading.cervical_mucus,
        }
    }
}

/// CSV row format for flow entries
#[derive(Debug, Serialize, Deserialize)]
struct FlowRow {
    date: NaiveDate,
    flow_intensity: FlowIntensity,
}

impl From<FlowRow> for FlowEntry {
    fn from(row: FlowRow) -> Self {
        FlowEntry::new(row.date, row.flow_intensity)
    }
}

impl From<&FlowEntry> for FlowRow {
    fn from(entry: &FlowEntry) -> Self {
        FlowRow {
            date: entry.date,
            flow_intensity: entry.intensity,
        }
    }
}

/// Everything recorded for one day
#[derive(Clone, Debug, PartialEq)]
pub struct DayEntry {
    pub reading: TemperatureReading,
    /// `None` records the day as bleeding-free
    pub flow: Option<FlowIntensity>,
}

/// Reject temperatures outside the plausible waking range
pub fn validate_temperature(temperature: f64) -> Result<()> {
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        return Err(Error::InvalidEntry(format!(
            "temperature {:.2} outside {:.2}–{:.2} °C",
            temperature, MIN_TEMPERATURE, MAX_TEMPERATURE
        )));
    }
    Ok(())
}

/// Entry storage rooted at a data directory
#[derive(Clone, Debug)]
pub struct EntryStore {
    dir: PathBuf,
}

impl EntryStore {
    /// Create a store for the given data directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn temperatures_path(&self) -> PathBuf {
        self.dir.join(TEMPERATURES_FILE)
    }

    pub fn periods_path(&self) -> PathBuf {
        self.dir.join(PERIODS_FILE)
    }

    fn lock(&self, exclusive: bool) -> Result<File> {
        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(file)
    }

    /// Load readings on or after `since`, date-ascending.
    ///
    /// Malformed or out-of-range rows are logged and skipped.
    pub fn load_temperatures(&self, since: Option<NaiveDate>) -> Result<Vec<TemperatureReading>> {
        let lock = self.lock(false)?;
        let rows: Vec<TemperatureRow> = read_rows(&self.temperatures_path());
        lock.unlock()?;

        let mut readings: Vec<TemperatureReading> = rows
            .into_iter()
            .filter(|row| since.map_or(true, |s| row.date >= s))
            .filter_map(|row| {
                let date = row.date;
                TemperatureReading::try_from(row)
                    .map_err(|e| tracing::warn!("Skipping reading for {}: {}", date, e))
                    .ok()
            })
            .collect();
        readings.sort_by_key(|r| r.date);

        tracing::info!("Loaded {} temperature readings", readings.len());
        Ok(readings)
    }

    /// Load flow entries on or after `since`, date-ascending
    pub fn load_flow_entries(&self, since: Option<NaiveDate>) -> Result<Vec<FlowEntry>> {
        let lock = self.lock(false)?;
        let rows: Vec<FlowRow> = read_rows(&self.periods_path());
        lock.unlock()?;

        let mut entries: Vec<FlowEntry> = rows
            .into_iter()
            .filter(|row| since.map_or(true, |s| row.date >= s))
            .map(FlowEntry::from)
            .collect();
        entries.sort_by_key(|e| e.date);

        tracing::info!("Loaded {} flow entries", entries.len());
        Ok(entries)
    }

    /// Insert or replace everything recorded for a day.
    ///
    /// A day without flow removes any flow entry previously stored for it.
    /// Both files are staged before either is replaced.
    pub fn upsert_day(&self, entry: &DayEntry) -> Result<()> {
        validate_temperature(entry.reading.temperature)?;
        let date = entry.reading.date;

        let lock = self.lock(true)?;

        let mut temps: Table<TemperatureRow> = Table::read(&self.temperatures_path(), TEMPERATURE_HEADER)?;
        temps.remove_date(date);
        temps.insert(date, TemperatureRow::from(&entry.reading));

        let mut flows: Table<FlowRow> = Table::read(&self.periods_path(), FLOW_HEADER)?;
        flows.remove_date(date);
        if let Some(intensity) = entry.flow {
            flows.insert(date, FlowRow::from(&FlowEntry::new(date, intensity)));
        }

        let staged_temps = temps.stage(&self.temperatures_path())?;
        let staged_flows = flows.stage(&self.periods_path())?;
        commit(staged_temps, &self.temperatures_path())?;
        commit(staged_flows, &self.periods_path())?;

        lock.unlock()?;
        tracing::info!("Recorded entry for {}", date);
        Ok(())
    }

    /// Remove the reading and flow entry for a day.
    ///
    /// Returns whether anything was stored for that day.
    pub fn delete_day(&self, date: NaiveDate) -> Result<bool> {
        let lock = self.lock(true)?;

        let mut temps: Table<TemperatureRow> = Table::read(&self.temperatures_path(), TEMPERATURE_HEADER)?;
        let mut flows: Table<FlowRow> = Table::read(&self.periods_path(), FLOW_HEADER)?;

        let removed_temp = temps.remove_date(date);
        let removed_flow = flows.remove_date(date);

        if removed_temp || removed_flow {
            let staged_temps = temps.stage(&self.temperatures_path())?;
            let staged_flows = flows.stage(&self.periods_path())?;
            commit(staged_temps, &self.temperatures_path())?;
            commit(staged_flows, &self.periods_path())?;
            tracing::info!("Deleted entries for {}", date);
        }

        lock.unlock()?;
        Ok(removed_temp || removed_flow)
    }
}

/// One line of a data file during a read-modify-write
enum TableRow<T> {
    /// Existing line, written back byte for byte
    Stored(ByteRecord),
    Added { date: NaiveDate, row: T },
}

impl<T> TableRow<T> {
    fn date(&self) -> Option<NaiveDate> {
        match self {
            TableRow::Stored(record) => record_date(record),
            TableRow::Added { date, .. } => Some(*date),
        }
    }
}

/// A data file loaded for rewriting.
///
/// Unlike the loaders, nothing is dropped: rows the loaders would skip are
/// carried through unchanged, and an unreadable file is an error.
struct Table<T> {
    header: &'static [&'static str],
    rows: Vec<TableRow<T>>,
}

impl<T: Serialize> Table<T> {
    fn read(path: &Path, header: &'static [&'static str]) -> Result<Self> {
        let mut rows: Vec<TableRow<T>> = Vec::new();

        if path.exists() {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(path)?;
            for record in reader.byte_records() {
                rows.push(TableRow::Stored(record?));
            }
        }

        // Only a line matching the expected header is treated as one
        let has_header = matches!(rows.first(), Some(TableRow::Stored(first)) if is_header(first, header));
        if has_header {
            rows.remove(0);
        }

        Ok(Self { header, rows })
    }

    /// Drop every row for `date`; returns whether any existed
    fn remove_date(&mut self, date: NaiveDate) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.date() != Some(date));
        self.rows.len() < before
    }

    fn insert(&mut self, date: NaiveDate, row: T) {
        self.rows.push(TableRow::Added { date, row });
    }

    /// Write the table, date-ascending, to a temp file beside `path`.
    ///
    /// Rows without a readable date sort first.
    fn stage(mut self, path: &Path) -> Result<NamedTempFile> {
        let parent = path.parent().ok_or_else(|| {
            Error::Other(format!("data path {:?} has no parent directory", path))
        })?;
        let temp = NamedTempFile::new_in(parent)?;

        self.rows.sort_by_key(|row| row.date());

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_writer(temp.as_file());
            writer.write_record(self.header)?;
            for row in &self.rows {
                match row {
                    TableRow::Stored(record) => writer.write_byte_record(record)?,
                    TableRow::Added { row, .. } => writer.serialize(row)?,
                }
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        tracing::debug!("Staged {} rows for {:?}", self.rows.len(), path);
        Ok(temp)
    }
}

fn is_header(record: &ByteRecord, header: &[&str]) -> bool {
    record.len() == header.len()
        && record
            .iter()
            .zip(header)
            .all(|(field, name)| field == name.as_bytes())
}

fn record_date(record: &ByteRecord) -> Option<NaiveDate> {
    let field = std::str::from_utf8(record.get(0)?).ok()?;
    field.trim().parse().ok()
}

/// Atomically replace `path` with a staged file
fn commit(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Read all parseable rows; a missing file is an empty table
fn read_rows<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        tracing::debug!("No data file at {:?}", path);
        return Vec::new();
    }

    let mut reader = match csv::ReaderBuilder::new().has_headers(true).from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            tracing::warn!("Unable to open {:?}: {}. Treating as empty.", path, e);
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::warn!("Failed to deserialize row in {:?}: {}", path, e);
            }
        }
    }
    rows
}
