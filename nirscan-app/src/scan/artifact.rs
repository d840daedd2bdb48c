//! Scan artifact files
//!
//! Artifacts are CSV in the legacy layout: a leading unnamed index
//! column followed by
//!
//! ```text
//! header_version, scan_name, scan_time, temperature_system,
//! temperature_detector, humidity, pga, wavelength, intensity,
//! reference, valid_length, absorbance
//! ```
//!
//! Undefined values are written as empty cells. Only the absorbance
//! column is required when reading.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use csv::{ReaderBuilder, WriterBuilder};
use nirscan_core::spectrum::{PreprocessError, SpectralRecord};
use tracing::{debug, trace};

/// Column order after the index column
pub const COLUMNS: [&str; 12] = [
    "header_version",
    "scan_name",
    "scan_time",
    "temperature_system",
    "temperature_detector",
    "humidity",
    "pga",
    "wavelength",
    "intensity",
    "reference",
    "valid_length",
    "absorbance",
];

/// Artifact read/write failures
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{}: 'absorbance' column not found", .path.display())]
    MissingAbsorbance { path: PathBuf },
    #[error("{} row {row}: invalid number '{value}' in column {column}", .path.display())]
    BadValue {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("{}: no data rows", .path.display())]
    Empty { path: PathBuf },
    #[error("{}: {source}", .path.display())]
    Record {
        path: PathBuf,
        source: PreprocessError,
    },
}

/// Keep alphanumerics, `-` and `_`, then trim leading/trailing `-`/`_`
pub fn sanitize_prefix(prefix: &str) -> String {
    let kept: String = prefix
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    kept.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// File name for an artifact taken at `time`
///
/// Unprefixed names are the bare `YYYYMMDDHHMMSS` timestamp, which is
/// what automatic discovery looks for.
pub fn artifact_name(time: &DateTime<Local>, prefix: Option<&str>, extension: &str) -> String {
    let stamp = time.format("%Y%m%d%H%M%S");
    match prefix.map(sanitize_prefix).filter(|p| !p.is_empty()) {
        Some(p) => format!("{}-{}.{}", p, stamp, extension),
        None => format!("{}.{}", stamp, extension),
    }
}

fn cell(v: Option<f32>) -> String {
    match v {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

/// Write a record in the legacy layout
pub fn write_artifact(
    path: &Path,
    record: &SpectralRecord,
    scan_name: &str,
    time: &DateTime<Local>,
) -> Result<(), ArtifactError> {
    let csv_err = |source| ArtifactError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = WriterBuilder::new().from_writer(file);

    let mut header = vec![""];
    header.extend_from_slice(&COLUMNS);
    writer.write_record(&header).map_err(csv_err)?;

    let len = record.len();
    let scan_time = time.format("%Y-%m-%d %H:%M:%S").to_string();
    let at = |series: Option<&[f32]>, i: usize| series.and_then(|s| s.get(i).copied());

    for i in 0..len {
        let row = [
            i.to_string(),
            "0".to_string(),
            scan_name.to_string(),
            scan_time.clone(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            cell(at(record.wavelength(), i)),
            cell(at(Some(record.intensity()), i)),
            cell(at(record.reference(), i)),
            len.to_string(),
            cell(at(Some(record.absorbance()), i)),
        ];
        writer.write_record(&row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} points to {}", len, path.display());
    Ok(())
}

fn parse_cell(
    path: &Path,
    row: usize,
    column: &'static str,
    raw: &str,
) -> Result<f32, ArtifactError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(f32::NAN);
    }
    raw.parse::<f32>().map_err(|_| ArtifactError::BadValue {
        path: path.to_path_buf(),
        row,
        column,
        value: raw.to_string(),
    })
}

/// Parse a cell of a column classification does not use
///
/// Anything unparseable reads as undefined.
fn parse_optional(row: usize, column: &'static str, raw: &str) -> f32 {
    let raw = raw.trim();
    match raw.parse::<f32>() {
        Ok(v) => v,
        Err(_) => {
            if !raw.is_empty() {
                trace!("Row {} {}: '{}' read as undefined", row, column, raw);
            }
            f32::NAN
        }
    }
}

/// Read a record from an artifact
///
/// Headers are matched case-insensitively after trimming. Empty and
/// `nan` cells read as undefined. Only the absorbance column is parsed
/// strictly; bad cells elsewhere read as undefined.
pub fn read_artifact(path: &Path) -> Result<SpectralRecord, ArtifactError> {
    let csv_err = |source| ArtifactError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let absorbance_idx = column("absorbance").ok_or_else(|| ArtifactError::MissingAbsorbance {
        path: path.to_path_buf(),
    })?;
    let optional = [
        ("wavelength", column("wavelength")),
        ("intensity", column("intensity")),
        ("reference", column("reference")),
    ];

    let mut absorbance = Vec::new();
    let mut extra: [Vec<f32>; 3] = Default::default();

    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err)?;
        let get = |idx: usize| record.get(idx).unwrap_or("");
        absorbance.push(parse_cell(path, row, "absorbance", get(absorbance_idx))?);
        for (series, (name, idx)) in extra.iter_mut().zip(optional.iter()) {
            if let Some(idx) = idx {
                series.push(parse_optional(row, *name, get(*idx)));
            }
        }
    }

    if absorbance.is_empty() {
        return Err(ArtifactError::Empty {
            path: path.to_path_buf(),
        });
    }

    let [wavelength, intensity, reference] = extra;
    let mut record = SpectralRecord::from_absorbance(absorbance);
    if optional[0].1.is_some() {
        record = record.with_wavelength(wavelength);
    }
    if optional[1].1.is_some() {
        record = record
            .with_raw(intensity, optional[2].1.map(|_| reference))
            .map_err(|source| ArtifactError::Record {
                path: path.to_path_buf(),
                source,
            })?;
    }
    debug!("Read {} points from {}", record.len(), path.display());
    Ok(record)
}
