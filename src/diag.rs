//! Diagnostics channel for skipped or ignored constructs.
//!
//! Diagnostics are a side-effect stream on the `log` facade, never returned
//! to the caller as data. Every record carries the owning unit label (if
//! any), the file name and the line number of the offending construct.

use std::{fmt, path::Path};

use log::Level;

/// Emit one diagnostic record.
pub(crate) fn emit(
    level: Level,
    unit: Option<&str>,
    filename: &Path,
    line: u32,
    args: fmt::Arguments<'_>,
) {
    match unit {
        Some(unit) => log!(level, "[{unit}] {}:{line}: {args}", filename.display()),
        None => log!(level, "{}:{line}: {args}", filename.display()),
    }
}
