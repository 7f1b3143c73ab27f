use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::modes::{operand_len, AddrMode};

/// Opcodes per table row; the row index is the high nibble.
pub const COLUMNS: usize = 16;
pub const ROWS: usize = 16;
/// Cell text marking an undefined opcode.
pub const SENTINEL: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFormat {
    pub delimiter: u8,
    /// `None` turns quoting off entirely.
    pub quote: Option<u8>,
    /// Reject mode tags that `AddrMode` does not know instead of sizing them
    /// with the fallback length.
    pub strict_modes: bool,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            quote: Some(b'|'),
            strict_modes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpcodeEntry {
    pub opcode: u8,
    pub operand_len: u8,
    pub mnemonic: String,
    pub tag: String,
}

impl OpcodeEntry {
    /// Encoded size: opcode byte plus operands.
    pub fn size(&self) -> usize {
        1 + self.operand_len as usize
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("cannot read encoding table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read encoding table: {0}")]
    Read(#[source] std::io::Error),
    #[error("malformed table record: {0}")]
    Csv(#[from] csv::Error),
    #[error("cell at row {row}, column {column} has no addressing mode: {cell:?}")]
    MissingModeTag {
        row: usize,
        column: usize,
        cell: String,
    },
    #[error("cell at row {row}, column {column} lies outside the 16x16 opcode grid: {cell:?}")]
    OutOfGrid {
        row: usize,
        column: usize,
        cell: String,
    },
    #[error("unknown addressing mode {tag:?} at row {row}, column {column}")]
    UnknownMode {
        row: usize,
        column: usize,
        tag: String,
    },
}

pub fn load_table(path: &Path, fmt: &TableFormat) -> Result<Vec<OpcodeEntry>, TableError> {
    let text = fs::read(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_table(text.as_slice(), fmt)?;
    debug!(path = %path.display(), entries = entries.len(), "loaded encoding table");
    Ok(entries)
}

/// Parse the table row-major, one physical line per row. Blank lines are rows
/// with no defined opcodes. Empty and sentinel cells are skipped; every other
/// cell is split on its first space into mnemonic and mode tag.
pub fn parse_table<R: Read>(mut rdr: R, fmt: &TableFormat) -> Result<Vec<OpcodeEntry>, TableError> {
    let mut text = Vec::new();
    rdr.read_to_end(&mut text).map_err(TableError::Read)?;

    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(fmt.delimiter)
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'));
    match fmt.quote {
        Some(q) => builder.quote(q),
        None => builder.quoting(false),
    };

    let mut entries = Vec::new();
    let mut unlisted: HashSet<String> = HashSet::new();
    for (row, line) in text.split(|&b| b == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let Some(record) = builder.from_reader(line).records().next() else {
            continue;
        };
        let record = record?;
        for (column, cell) in record.iter().enumerate() {
            if cell.is_empty() || cell == SENTINEL {
                continue;
            }
            if row >= ROWS || column >= COLUMNS {
                return Err(TableError::OutOfGrid { row, column, cell: cell.to_string() });
            }
            let (mnemonic, tag) = match cell.split_once(' ') {
                Some((m, t)) if !t.is_empty() => (m, t),
                _ => return Err(TableError::MissingModeTag { row, column, cell: cell.to_string() }),
            };
            if AddrMode::from_tag(tag).is_none() {
                if fmt.strict_modes {
                    return Err(TableError::UnknownMode { row, column, tag: tag.to_string() });
                }
                if unlisted.insert(tag.to_string()) {
                    warn!(tag, row, column, "unlisted addressing mode, assuming a one-byte operand");
                }
            }
            entries.push(OpcodeEntry {
                opcode: (row * COLUMNS + column) as u8,
                operand_len: operand_len(tag),
                mnemonic: mnemonic.to_string(),
                tag: tag.to_string(),
            });
        }
    }
    Ok(entries)
}

/// Operand length per opcode value; `None` for opcodes the table leaves undefined.
pub fn operand_lengths(entries: &[OpcodeEntry]) -> [Option<u8>; 256] {
    let mut lengths = [None; 256];
    for e in entries {
        lengths[e.opcode as usize] = Some(e.operand_len);
    }
    lengths
}
