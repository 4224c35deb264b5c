//! # dropconf
//!
//! An embeddable parser for simple, line based, shallow configuration files
//! consisting of `[Section]` headers and `key = value` assignments.
//!
//! `dropconf` contains no knowledge about any concrete setting. Callers
//! describe their settings as a schema mapping `(section, key)` pairs to
//! value converters, and the engine takes care of everything else: logical
//! line assembly (continuations, comments), section tracking, schema lookup,
//! converter dispatch, `.include` handling and multi-file merging with
//! drop-in override directories.
//!
//! ## Features
//!
//! - Backslash line continuations with exact joining
//! - `#` and `;` comment lines
//! - Two interchangeable schema lookup strategies: linear table scan and
//!   minimal perfect hash
//! - Converter library for string, boolean, integer, enum and enum-set
//!   values, plus macros for generating enum converters
//! - Drop-in directory merging with deterministic override order
//! - Bounded `.include` recursion
//! - Best-effort error recovery: malformed lines are logged and skipped,
//!   only resource failures abort a parse
//!
//! ## Quick Start
//!
//! ```rust
//! use dropconf::{ConfigParser, ConfigTable, Convert};
//!
//! #[derive(Default)]
//! struct Settings {
//!     description: String,
//!     enabled: bool,
//! }
//!
//! let table = ConfigTable::new()
//!     .item("Service", "Description", 0, Convert::String(|s: &mut Settings| &mut s.description))
//!     .item("Service", "Enabled", 0, Convert::Boolean(|s: &mut Settings| &mut s.enabled));
//!
//! let input = "[Service]\nDescription = demo\nEnabled = yes\n";
//!
//! let mut settings = Settings::default();
//! ConfigParser::new(&table)
//!     .parse_stream("demo.conf", input.as_bytes(), &mut settings)
//!     .unwrap();
//!
//! assert_eq!(settings.description, "demo");
//! assert!(settings.enabled);
//! ```
//!
//! ## Modules
//!
//! - [`reader`] - logical line assembly from a character stream
//! - [`schema`] - schema entries and the two lookup strategies
//! - [`parser`] - the parsing and dispatch engine
//! - [`merge`] - drop-in directory discovery and multi-file merging
//! - [`convert`] - value converter library
//! - [`error`] - fatal error type

#[macro_use]
extern crate log;

/// Value converter library and converter-generating macros.
pub mod convert;

/// Fatal error type shared by all parse entry points.
pub mod error;

/// Multi-file merging and drop-in fragment discovery.
pub mod merge;

/// The parsing and dispatch engine.
pub mod parser;

/// Logical line assembly: continuations, comments, line numbers.
pub mod reader;

/// Schema entries and the linear / perfect-hash lookup strategies.
pub mod schema;

mod diag;
mod phash;

pub use convert::Convert;
pub use error::{ConfigError, MAX_INCLUDE_DEPTH};
pub use merge::fragment_files;
pub use parser::{ConfigParser, ValueCtx};
pub use schema::{ConfigTable, Entry, PerfTable, PerfTableBuilder, Resolve, SchemaError};
