/// Bytes per printed row.
pub const ROW_LEN: usize = 8;

/// Format `bytes` as rows of up to [`ROW_LEN`] uppercase hex pairs separated by spaces.
pub fn hex_rows(bytes: &[u8]) -> impl Iterator<Item = String> + '_ {
    bytes.chunks(ROW_LEN).map(|row| {
        row.iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    })
}
