use std::fs;
use std::io::{BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::table::{operand_lengths, OpcodeEntry};

/// Operand fill used by the single-pass ("mega") fixture.
pub const SINGLE_FILL: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    /// One pass, every operand byte `0xFF`.
    Single,
    /// One pass per byte value `0..=255`, concatenated in increasing order.
    Exhaustive,
}

impl FillMode {
    /// Only the literal token `giga` selects the exhaustive mode.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("giga") => FillMode::Exhaustive,
            _ => FillMode::Single,
        }
    }

    pub fn fill_values(self) -> RangeInclusive<u8> {
        match self {
            FillMode::Single => SINGLE_FILL..=SINGLE_FILL,
            FillMode::Exhaustive => 0..=u8::MAX,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            FillMode::Single => "mega.bin",
            FillMode::Exhaustive => "giga.bin",
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FixtureError {
    #[error("undefined opcode {opcode:#04x} at offset {offset:#x}")]
    UnknownOpcode { offset: usize, opcode: u8 },
    #[error("opcode {opcode:#04x} at offset {offset:#x} needs {needed} operand bytes, {available} left")]
    Truncated {
        offset: usize,
        opcode: u8,
        needed: usize,
        available: usize,
    },
    #[error("group at offset {offset:#x}: expected {expected}, found {found}")]
    Mismatch {
        offset: usize,
        expected: String,
        found: String,
    },
    #[error("fixture holds {found} groups, expected {expected}")]
    GroupCount { expected: usize, found: usize },
}

/// One opcode byte and the operand bytes that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group<'a> {
    pub offset: usize,
    pub opcode: u8,
    pub operands: &'a [u8],
}

pub fn encoded_len(entries: &[OpcodeEntry], mode: FillMode) -> usize {
    let pass: usize = entries.iter().map(OpcodeEntry::size).sum();
    pass * mode.fill_values().count()
}

/// Stream the fixture into `w`, returning the number of bytes written.
pub fn write_fixture<W: Write>(w: &mut W, entries: &[OpcodeEntry], mode: FillMode) -> std::io::Result<usize> {
    let mut written = 0;
    let mut group = Vec::with_capacity(3);
    for fill in mode.fill_values() {
        for e in entries {
            group.clear();
            group.push(e.opcode);
            group.resize(e.size(), fill);
            w.write_all(&group)?;
            written += group.len();
        }
    }
    Ok(written)
}

pub fn encode_fixture(entries: &[OpcodeEntry], mode: FillMode) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(entries, mode));
    write_fixture(&mut buf, entries, mode).expect("writing to a Vec cannot fail");
    buf
}

/// Write the fixture to `path`, replacing whatever is there. The bytes go to a
/// temporary file in the same directory which is renamed into place, so the
/// destination is either the complete fixture or untouched.
pub fn write_fixture_file(path: &Path, entries: &[OpcodeEntry], mode: FillMode) -> Result<usize> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create temporary file in {}", dir.display()))?;
    let written = {
        let mut w = BufWriter::new(&mut tmp);
        let n = write_fixture(&mut w, entries, mode)?;
        w.flush()?;
        n
    };
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("cannot move fixture into place at {}", path.display()))?;
    info!(path = %path.display(), bytes = written, ?mode, "wrote fixture");
    Ok(written)
}

/// Split a fixture into opcode groups using the per-opcode operand lengths.
pub fn walk_fixture<'a>(bytes: &'a [u8], lengths: &[Option<u8>; 256]) -> Result<Vec<Group<'a>>, FixtureError> {
    let mut groups = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let opcode = bytes[offset];
        let needed = lengths[opcode as usize].ok_or(FixtureError::UnknownOpcode { offset, opcode })? as usize;
        let rest = &bytes[offset + 1..];
        if rest.len() < needed {
            return Err(FixtureError::Truncated { offset, opcode, needed, available: rest.len() });
        }
        groups.push(Group { offset, opcode, operands: &rest[..needed] });
        offset += 1 + needed;
    }
    Ok(groups)
}

/// Check that `bytes` is exactly the fixture `entries` and `mode` describe.
pub fn verify_fixture(bytes: &[u8], entries: &[OpcodeEntry], mode: FillMode) -> Result<(), FixtureError> {
    let groups = walk_fixture(bytes, &operand_lengths(entries))?;
    let passes = mode.fill_values().count();
    if groups.len() != entries.len() * passes {
        return Err(FixtureError::GroupCount { expected: entries.len() * passes, found: groups.len() });
    }
    let expected = mode
        .fill_values()
        .flat_map(|fill| entries.iter().map(move |e| (e, fill)));
    for (g, (e, fill)) in groups.iter().zip(expected) {
        let ok = g.opcode == e.opcode && g.operands.iter().all(|&b| b == fill);
        if !ok {
            return Err(FixtureError::Mismatch {
                offset: g.offset,
                expected: format!("{:02X} x{} {:02X}", e.opcode, e.operand_len, fill),
                found: format!("{:02X} {:02X?}", g.opcode, g.operands),
            });
        }
    }
    debug!(groups = groups.len(), "fixture verified");
    Ok(())
}

/// Read back a fixture file and verify it.
pub fn verify_fixture_file(path: &Path, entries: &[OpcodeEntry], mode: FillMode) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("cannot read fixture {}", path.display()))?;
    verify_fixture(&bytes, entries, mode).with_context(|| format!("fixture {} does not match the table", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(opcode: u8, operand_len: u8) -> OpcodeEntry {
        OpcodeEntry { opcode, operand_len, mnemonic: "XXX".into(), tag: String::new() }
    }

    #[test]
    fn mode_selection() {
        assert_eq!(FillMode::from_arg(None), FillMode::Single);
        assert_eq!(FillMode::from_arg(Some("giga")), FillMode::Exhaustive);
        assert_eq!(FillMode::from_arg(Some("GIGA")), FillMode::Single);
        assert_eq!(FillMode::from_arg(Some("mega")), FillMode::Single);
        assert_eq!(FillMode::Exhaustive.fill_values().count(), 256);
        assert_eq!(FillMode::Single.file_name(), "mega.bin");
    }

    #[test]
    fn single_mode_fills_with_ff() {
        let entries = [entry(0x00, 0), entry(0x4C, 2), entry(0xA9, 1)];
        assert_eq!(encode_fixture(&entries, FillMode::Single), vec![0x00, 0x4C, 0xFF, 0xFF, 0xA9, 0xFF]);
    }

    #[test]
    fn exhaustive_mode_runs_one_pass_per_value() {
        let entries = [entry(0xEA, 0), entry(0xA9, 1)];
        let bytes = encode_fixture(&entries, FillMode::Exhaustive);
        assert_eq!(bytes.len(), 256 * 3);
        assert_eq!(&bytes[..6], &[0xEA, 0xA9, 0x00, 0xEA, 0xA9, 0x01]);
        assert_eq!(&bytes[bytes.len() - 3..], &[0xEA, 0xA9, 0xFF]);
        assert_eq!(encoded_len(&entries, FillMode::Exhaustive), bytes.len());
    }

    #[test]
    fn walk_reports_unknown_and_truncated() {
        let entries = [entry(0x20, 2)];
        let lengths = operand_lengths(&entries);
        assert_eq!(
            walk_fixture(&[0x20, 0x00, 0x10, 0x01], &lengths),
            Err(FixtureError::UnknownOpcode { offset: 3, opcode: 0x01 })
        );
        assert_eq!(
            walk_fixture(&[0x20, 0x00], &lengths),
            Err(FixtureError::Truncated { offset: 0, opcode: 0x20, needed: 2, available: 1 })
        );
    }

    #[test]
    fn verify_catches_wrong_fill() {
        let entries = [entry(0xA9, 1)];
        assert!(verify_fixture(&[0xA9, 0xFF], &entries, FillMode::Single).is_ok());
        assert!(matches!(
            verify_fixture(&[0xA9, 0x00], &entries, FillMode::Single),
            Err(FixtureError::Mismatch { offset: 0, .. })
        ));
        assert_eq!(
            verify_fixture(&[0xA9, 0xFF, 0xA9, 0xFF], &entries, FillMode::Single),
            Err(FixtureError::GroupCount { expected: 1, found: 2 })
        );
    }

    #[test]
    fn file_write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mega.bin");
        fs::write(&path, vec![0u8; 64]).unwrap();
        let entries = [entry(0x4C, 2)];
        let n = write_fixture_file(&path, &entries, FillMode::Single).unwrap();
        assert_eq!(n, 3);
        assert_eq!(fs::read(&path).unwrap(), vec![0x4C, 0xFF, 0xFF]);
        verify_fixture_file(&path, &entries, FillMode::Single).unwrap();
    }

    #[test]
    fn missing_directory_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("mega.bin");
        assert!(write_fixture_file(&path, &[entry(0, 0)], FillMode::Single).is_err());
        assert!(!path.exists());
    }
}
