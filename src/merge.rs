//! Multi-file merging with drop-in override directories.
//!
//! A configuration is the primary file (optional) followed by fragment
//! files from an ordered list of drop-in directories. Fragments within a
//! directory are parsed in lexicographic file-name order, so numeric
//! prefixes (`10-defaults.conf`, `50-site.conf`) give a deterministic
//! override order. Later assignments simply overwrite earlier ones through
//! the converters; there is no "first wins" logic at this layer.

use std::{
    fs,
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
};

use crate::{error::ConfigError, parser::ConfigParser};

impl<U> ConfigParser<'_, U> {
    /// Parse the primary file (if it exists) and then every fragment from
    /// the drop-in directories, in order, against the same storage.
    ///
    /// A missing primary file or a missing directory is not an error. The
    /// merge fails fast on the first fatal error from any file; non-fatal
    /// diagnostics are only logged.
    pub fn parse_many(
        &self,
        primary: Option<&Path>,
        dropin_dirs: &[PathBuf],
        userdata: &mut U,
    ) -> Result<(), ConfigError> {
        if let Some(path) = primary {
            match fs::File::open(path) {
                Ok(file) => self.parse_stream(path, BufReader::new(file), userdata)?,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("{} does not exist, skipping", path.display());
                }
                Err(source) => {
                    return Err(ConfigError::Io {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        for dir in dropin_dirs {
            for fragment in fragment_files(dir)? {
                self.parse_file(&fragment, userdata)?;
            }
        }
        Ok(())
    }
}

/// List the fragment files of one drop-in directory, sorted by file name.
///
/// A missing directory yields an empty list; any other listing failure is
/// fatal. Only regular files are returned.
pub fn fragment_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
