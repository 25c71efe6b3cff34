//! Loading the question bank from a CSV source.
//!
//! The first row is a header; columns are matched by name, so their order
//! does not matter and unknown columns are ignored. Every row is validated
//! while loading, so a bad row fails startup instead of a later round.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use reaction_core::model::{QuestionBank, ReactionDraft, ReactionField, ReactionRecord};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("question source {path} is unavailable: {source}")]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("refusing to overwrite existing file {0}")]
    AlreadyExists(PathBuf),
}

#[derive(Debug, Deserialize)]
struct RawReaction {
    #[serde(rename = "Element A", default)]
    element_a: Option<String>,
    #[serde(rename = "Element B", default)]
    element_b: Option<String>,
    #[serde(rename = "Products", default)]
    products: Option<String>,
    #[serde(rename = "Reaction Type", default)]
    reaction_type: Option<String>,
    #[serde(rename = "Conditions", default)]
    conditions: Option<String>,
    #[serde(rename = "Reaction Equation", default)]
    reaction_equation: Option<String>,
    #[serde(rename = "Notes", default)]
    notes: Option<String>,
}

impl From<RawReaction> for ReactionDraft {
    fn from(raw: RawReaction) -> Self {
        Self {
            element_a: raw.element_a.unwrap_or_default(),
            element_b: raw.element_b.unwrap_or_default(),
            products: raw.products.unwrap_or_default(),
            reaction_type: raw.reaction_type.unwrap_or_default(),
            conditions: raw.conditions.unwrap_or_default(),
            reaction_equation: raw.reaction_equation,
            notes: raw.notes,
        }
    }
}

/// Read and validate every reaction in the CSV file at `path`.
///
/// An empty bank is returned as-is; callers decide whether that is fatal.
///
/// # Errors
///
/// Returns `SourceError::DataUnavailable` if the file cannot be opened or read,
/// and `SourceError::MalformedRecord` for a missing column or an invalid row.
pub fn load_bank(path: &Path) -> Result<QuestionBank, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let bank = read_bank(file, path)?;
    info!(path = %path.display(), records = bank.len(), "loaded question bank");
    Ok(bank)
}

/// Same as [`load_bank`] for an already-open reader.
///
/// # Errors
///
/// See [`load_bank`].
pub fn load_bank_from_reader<R: Read>(reader: R) -> Result<QuestionBank, SourceError> {
    read_bank(reader, Path::new("<reader>"))
}

fn read_bank<R: Read>(reader: R, origin: &Path) -> Result<QuestionBank, SourceError> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| csv_error(e, origin))?
        .clone();
    check_required_columns(&headers)?;

    let mut records: Vec<ReactionRecord> = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| csv_error(e, origin))?;
        let line = row.position().map_or(0, csv::Position::line);

        let raw: RawReaction =
            row.deserialize(Some(&headers))
                .map_err(|e| SourceError::MalformedRecord {
                    line,
                    reason: e.to_string(),
                })?;
        let record = ReactionDraft::from(raw)
            .validate()
            .map_err(|e| SourceError::MalformedRecord {
                line,
                reason: e.to_string(),
            })?;
        records.push(record);
    }

    Ok(QuestionBank::new(records))
}

fn check_required_columns(headers: &StringRecord) -> Result<(), SourceError> {
    for field in ReactionField::REQUIRED {
        if !headers.iter().any(|h| h == field.column()) {
            return Err(SourceError::MalformedRecord {
                line: 1,
                reason: format!("missing column `{}`", field.column()),
            });
        }
    }
    Ok(())
}

fn csv_error(err: csv::Error, origin: &Path) -> SourceError {
    let line = err.position().map_or(0, csv::Position::line);
    match err.into_kind() {
        csv::ErrorKind::Io(source) => SourceError::DataUnavailable {
            path: origin.to_path_buf(),
            source,
        },
        other => SourceError::MalformedRecord {
            line,
            reason: format!("{other:?}"),
        },
    }
}

//
// ─── SAMPLE DATA ───────────────────────────────────────────────────────────────
//

const SAMPLE_HEADER: [&str; 7] = [
    "Element A",
    "Element B",
    "Products",
    "Reaction Type",
    "Conditions",
    "Reaction Equation",
    "Notes",
];

const SAMPLE_ROWS: [[&str; 7]; 6] = [
    [
        "H2",
        "O2",
        "H2O",
        "Synthesis",
        "Spark",
        "2H2 + O2 -> 2H2O",
        "Highly exothermic; burns with a pale blue flame",
    ],
    [
        "Na",
        "Cl2",
        "NaCl",
        "Synthesis",
        "Heat",
        "2Na + Cl2 -> 2NaCl",
        "Bright yellow flame, white solid forms",
    ],
    [
        "CH4",
        "O2",
        "CO2 + H2O",
        "Combustion",
        "Ignition",
        "CH4 + 2O2 -> CO2 + 2H2O",
        "Complete combustion of natural gas",
    ],
    [
        "Zn",
        "HCl",
        "ZnCl2 + H2",
        "Single Displacement",
        "Room temperature",
        "Zn + 2HCl -> ZnCl2 + H2",
        "Hydrogen gas bubbles off",
    ],
    [
        "AgNO3",
        "NaCl",
        "AgCl + NaNO3",
        "Double Displacement",
        "Aqueous solution",
        "AgNO3 + NaCl -> AgCl + NaNO3",
        "White precipitate of silver chloride",
    ],
    [
        "N2",
        "H2",
        "NH3",
        "Synthesis",
        "High pressure, iron catalyst",
        "N2 + 3H2 -> 2NH3",
        "Haber process",
    ],
];

/// Write a small starter question source to `path`.
///
/// # Errors
///
/// Returns `SourceError::AlreadyExists` if `path` exists and `overwrite` is false,
/// or `SourceError::DataUnavailable` if the file cannot be written.
pub fn write_sample_source(path: &Path, overwrite: bool) -> Result<usize, SourceError> {
    if path.exists() && !overwrite {
        return Err(SourceError::AlreadyExists(path.to_path_buf()));
    }

    let unavailable = |source: std::io::Error| SourceError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(unavailable)?;
    let mut writer = WriterBuilder::new().from_writer(file);
    writer
        .write_record(SAMPLE_HEADER)
        .map_err(|e| csv_error(e, path))?;
    for row in SAMPLE_ROWS {
        writer.write_record(row).map_err(|e| csv_error(e, path))?;
    }
    writer.flush().map_err(unavailable)?;

    info!(path = %path.display(), records = SAMPLE_ROWS.len(), "wrote sample question source");
    Ok(SAMPLE_ROWS.len())
}
