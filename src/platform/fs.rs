// CaseAlert - platform/fs.rs
//
// Filesystem helpers for the input table.

use std::io;
use std::path::Path;

/// Size of a file in bytes, for the input size limit check.
pub fn file_size(path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8 (e.g. Latin-1 exports from spreadsheet
/// tools), uses lossy conversion so that the load never fails on encoding.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
