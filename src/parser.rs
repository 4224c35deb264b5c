//! The parsing and dispatch engine.
//!
//! [`ConfigParser`] walks the logical lines of one file, tracks the current
//! section, resolves each assignment against the caller's schema and hands
//! the raw value to the matched converter. Malformed constructs are logged
//! and skipped; only resource failures and fatal converter returns abort a
//! parse.

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::Level;

use crate::{
    diag,
    error::{ConfigError, MAX_INCLUDE_DEPTH},
    reader::LineReader,
    schema::Resolve,
};

/// Reserved key dispatching a file inclusion, recognized independently of
/// the schema when includes are enabled.
pub const INCLUDE_KEY: &str = ".include";

/// Per-invocation context handed to converters.
///
/// Everything needed to emit a well-located diagnostic, plus the entry's
/// discriminator. Converters must not retain the raw value text beyond the
/// call; the borrows here enforce that.
pub struct ValueCtx<'a> {
    /// Owning logical unit, used only for diagnostics.
    pub unit: Option<&'a str>,
    /// File currently being parsed.
    pub filename: &'a Path,
    /// Line the assignment started on.
    pub line: u32,
    /// Current section, `None` before the first header.
    pub section: Option<&'a str>,
    /// Line the current section header appeared on.
    pub section_line: u32,
    /// Key (left-hand side) of the assignment.
    pub lvalue: &'a str,
    /// Discriminator from the matched schema entry.
    pub ltype: i32,
}

impl ValueCtx<'_> {
    /// Emit a warn-level diagnostic tied to this assignment's location.
    pub fn warn(&self, msg: impl fmt::Display) {
        self.log(Level::Warn, msg);
    }

    /// Emit an error-level diagnostic tied to this assignment's location.
    pub fn error(&self, msg: impl fmt::Display) {
        self.log(Level::Error, msg);
    }

    pub fn log(&self, level: Level, msg: impl fmt::Display) {
        diag::emit(level, self.unit, self.filename, self.line, format_args!("{msg}"));
    }
}

/// Per-file transient parse state, created per parse call and discarded at
/// its end.
#[derive(Default)]
struct ParseContext {
    section: Option<String>,
    section_line: u32,
    /// Set while inside a section the caller declared uninteresting; body
    /// lines are skipped silently until the next header.
    skip_section: bool,
}

/// Parser configuration bound to one schema and storage type.
///
/// The parser itself is stateless across files; one value can parse any
/// number of files, sequentially, against the same storage.
pub struct ConfigParser<'a, U> {
    resolver: &'a dyn Resolve<U>,
    unit: Option<&'a str>,
    sections: Option<&'a [&'a str]>,
    relaxed: bool,
    allow_include: bool,
    warn_on_unknown: bool,
}

impl<'a, U> ConfigParser<'a, U> {
    pub fn new(resolver: &'a dyn Resolve<U>) -> Self {
        Self {
            resolver,
            unit: None,
            sections: None,
            relaxed: false,
            allow_include: false,
            warn_on_unknown: true,
        }
    }

    /// Label of the logical unit this configuration belongs to, used only
    /// for diagnostics.
    pub fn unit(mut self, unit: &'a str) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Restrict parsing to the given section names. Headers outside the
    /// list are diagnosed once and their body lines skipped.
    pub fn sections(mut self, sections: &'a [&'a str]) -> Self {
        self.sections = Some(sections);
        self
    }

    /// Lower the severity of unknown-key and unknown-section diagnostics,
    /// and tolerate missing include targets.
    pub fn relaxed(mut self, relaxed: bool) -> Self {
        self.relaxed = relaxed;
        self
    }

    /// Recognize the reserved `.include` key.
    pub fn allow_include(mut self, allow_include: bool) -> Self {
        self.allow_include = allow_include;
        self
    }

    /// Whether to diagnose unknown keys at all. Defaults to `true`.
    pub fn warn_on_unknown(mut self, warn_on_unknown: bool) -> Self {
        self.warn_on_unknown = warn_on_unknown;
        self
    }

    /// Parse one character stream against the schema.
    ///
    /// `filename` is used for diagnostics and as the base for resolving
    /// relative include targets.
    pub fn parse_stream(
        &self,
        filename: impl AsRef<Path>,
        source: impl BufRead,
        userdata: &mut U,
    ) -> Result<(), ConfigError> {
        self.parse_source(filename.as_ref(), source, userdata, 0)
    }

    /// Open and parse one file against the schema.
    pub fn parse_file(&self, path: impl AsRef<Path>, userdata: &mut U) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(path, BufReader::new(file), userdata, 0)
    }

    fn parse_source(
        &self,
        filename: &Path,
        source: impl BufRead,
        userdata: &mut U,
        depth: usize,
    ) -> Result<(), ConfigError> {
        let mut reader = LineReader::new(source);
        let mut ctx = ParseContext::default();

        loop {
            let (line, text) = match reader.next_logical() {
                Ok(Some(logical)) => logical,
                Ok(None) => return Ok(()),
                Err(source) => {
                    return Err(ConfigError::Io {
                        path: filename.to_path_buf(),
                        source,
                    });
                }
            };
            self.parse_line(filename, line, &text, &mut ctx, userdata, depth)?;
        }
    }

    fn parse_line(
        &self,
        filename: &Path,
        line: u32,
        text: &str,
        ctx: &mut ParseContext,
        userdata: &mut U,
        depth: usize,
    ) -> Result<(), ConfigError> {
        // Directive form: ".include /path". The assignment form below
        // (".include = /path") is handled through the normal key split.
        if self.allow_include {
            if let Some(rest) = text.strip_prefix(INCLUDE_KEY) {
                let target = rest.trim_start();
                if rest.len() != target.len() && !target.is_empty() && !target.starts_with('=') {
                    return self.include(filename, line, target, userdata, depth);
                }
            }
        }

        if text.starts_with('[') {
            self.parse_header(filename, line, text, ctx);
            return Ok(());
        }

        let Some((lvalue, rvalue)) = split_assignment(text) else {
            self.syntax(filename, line, format_args!("Missing '='."));
            return Ok(());
        };
        if lvalue.is_empty() {
            self.syntax(filename, line, format_args!("Missing key before '='."));
            return Ok(());
        }

        if self.allow_include && lvalue == INCLUDE_KEY {
            return self.include(filename, line, rvalue, userdata, depth);
        }

        if ctx.skip_section {
            return Ok(());
        }

        let section = ctx.section.as_deref();
        match self.resolver.resolve(section, lvalue) {
            Some(entry) => {
                let vctx = ValueCtx {
                    unit: self.unit,
                    filename,
                    line,
                    section,
                    section_line: ctx.section_line,
                    lvalue,
                    ltype: entry.ltype,
                };
                entry.convert.invoke(&vctx, rvalue, userdata)
            }
            None => {
                // Unknown keys never abort a file, only their diagnostic
                // severity depends on the relaxed flag.
                if self.warn_on_unknown {
                    let level = if self.relaxed { Level::Warn } else { Level::Error };
                    diag::emit(
                        level,
                        self.unit,
                        filename,
                        line,
                        format_args!(
                            "Unknown key '{lvalue}' in section '{}', ignoring.",
                            section.unwrap_or("")
                        ),
                    );
                }
                Ok(())
            }
        }
    }

    fn parse_header(&self, filename: &Path, line: u32, text: &str, ctx: &mut ParseContext) {
        let body = &text[1..];
        let name = match body.strip_suffix(']') {
            Some(name) if !name.is_empty() && !name.contains(']') => name,
            _ => {
                // Malformed headers are not body lines either.
                self.syntax(filename, line, format_args!("Invalid section header: {text}"));
                return;
            }
        };

        ctx.section = Some(name.to_string());
        ctx.section_line = line;
        ctx.skip_section = false;

        if let Some(allowed) = self.sections {
            if !allowed.contains(&name) {
                let level = if self.relaxed { Level::Debug } else { Level::Warn };
                diag::emit(
                    level,
                    self.unit,
                    filename,
                    line,
                    format_args!("Unknown section '{name}'. Ignoring."),
                );
                ctx.skip_section = true;
            }
        }
    }

    fn include(
        &self,
        filename: &Path,
        line: u32,
        target: &str,
        userdata: &mut U,
        depth: usize,
    ) -> Result<(), ConfigError> {
        if depth >= MAX_INCLUDE_DEPTH {
            self.syntax(
                filename,
                line,
                format_args!("Include nesting too deep, refusing: {target}"),
            );
            return Err(ConfigError::IncludeDepth {
                filename: filename.to_path_buf(),
                line,
            });
        }

        // Relative targets resolve against the including file's directory.
        let mut path = PathBuf::from(target);
        if path.is_relative() {
            if let Some(parent) = filename.parent() {
                path = parent.join(path);
            }
        }

        match File::open(&path) {
            Ok(file) => self.parse_source(&path, BufReader::new(file), userdata, depth + 1),
            Err(source) if self.relaxed => {
                self.syntax(
                    filename,
                    line,
                    format_args!("Failed to open include file, ignoring: {}: {source}", path.display()),
                );
                Ok(())
            }
            Err(source) => Err(ConfigError::Include {
                filename: filename.to_path_buf(),
                line,
                target: path,
                source,
            }),
        }
    }

    fn syntax(&self, filename: &Path, line: u32, args: fmt::Arguments<'_>) {
        diag::emit(Level::Error, self.unit, filename, line, args);
    }
}

/// Split an assignment at the first unescaped `=`.
///
/// A `\=` sequence does not split; the escape is left in place for the
/// converter to interpret. Both sides are trimmed.
fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, b) in text.bytes().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'=' => return Some((text[..i].trim(), text[i + 1..].trim())),
            _ => {}
        }
    }
    None
}
