//! Script file preflight checks.
//!
//! Run before handing a file to the processor: catches directories,
//! unreadable paths, and binary files up front with shell-style messages.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("{0}: No such file or directory")]
    NotFound(String),

    #[error("{0}: Is a directory")]
    IsADirectory(String),

    #[error("{0}: Permission denied")]
    NotReadable(String),

    #[error("{0}: cannot execute binary file")]
    BinaryFile(String),
}

/// Validates that `path` is a readable text script.
///
/// Binary detection is a NUL-byte sniff over the first kilobyte, which
/// catches ELF executables and most compiled artifacts without reading
/// the whole file.
pub fn check_script_file(path: &Path) -> Result<(), PreflightError> {
    let display = path.display().to_string();
    let metadata = std::fs::metadata(path).map_err(|_| PreflightError::NotFound(display.clone()))?;
    if metadata.is_dir() {
        return Err(PreflightError::IsADirectory(display));
    }

    let mut file = File::open(path).map_err(|_| PreflightError::NotReadable(display.clone()))?;
    let mut head = [0u8; 1024];
    let read = file.read(&mut head).map_err(|_| PreflightError::NotReadable(display.clone()))?;
    if head[..read].contains(&0) {
        return Err(PreflightError::BinaryFile(display));
    }
    Ok(())
}
