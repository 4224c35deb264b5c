use std::{io, path::PathBuf};

use thiserror::Error;

/// Maximum `.include` nesting depth.
///
/// Exceeding the limit aborts the parse with [`ConfigError::IncludeDepth`],
/// which turns include cycles into a reported error instead of a stack or
/// file descriptor exhaustion.
pub const MAX_INCLUDE_DEPTH: usize = 16;

/// Fatal parse failures.
///
/// Everything else (malformed headers, missing `=`, unknown keys, bad
/// values) is recovered locally: the offending line is logged and skipped
/// and the parse continues. A file that only contains such problems still
/// parses to completion, leaving a best-effort configuration plus a log
/// trail.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file or directory could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An include target could not be opened in strict (non-relaxed) mode.
    #[error("{}:{line}: cannot include {}: {source}", filename.display(), target.display())]
    Include {
        filename: PathBuf,
        line: u32,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Include nesting exceeded [`MAX_INCLUDE_DEPTH`].
    #[error("{}:{line}: include depth limit ({MAX_INCLUDE_DEPTH}) exceeded", filename.display())]
    IncludeDepth { filename: PathBuf, line: u32 },

    /// A converter reported an unrecoverable failure.
    #[error("{message}")]
    Converter { message: String },
}

impl ConfigError {
    /// Build a fatal converter failure from a message.
    pub fn converter(message: impl Into<String>) -> Self {
        ConfigError::Converter {
            message: message.into(),
        }
    }
}
