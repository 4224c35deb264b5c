//! Value converter library.
//!
//! The engine has no notion of value types; every schema entry names a
//! [`Convert`] that turns the raw value text into a mutation of the
//! caller's storage. Converters decide what an empty value means, log
//! their own value-level diagnostics and keep the previous storage intact
//! on bad input. Returning an error from a converter is reserved for
//! unrecoverable failures and aborts the entire parse.

use crate::{error::ConfigError, parser::ValueCtx};

/// A value converter, dispatched per matched schema entry.
///
/// The built-in variants cover the common scalar settings through a field
/// accessor reaching into the caller's storage; anything richer (enums,
/// enum sets, unit parsing, ...) goes through [`Convert::Custom`], usually
/// generated with [`define_enum_converter!`](crate::define_enum_converter)
/// or [`define_enum_set_converter!`](crate::define_enum_set_converter).
pub enum Convert<U> {
    /// Assign the raw value text to a string field.
    String(fn(&mut U) -> &mut String),
    /// Assign the raw value text; an empty value resets the field to `None`.
    OptString(fn(&mut U) -> &mut Option<String>),
    /// Parse a boolean token (`1/yes/y/true/t/on` or `0/no/n/false/f/off`).
    Boolean(fn(&mut U) -> &mut bool),
    /// Parse an unsigned integer.
    Unsigned(fn(&mut U) -> &mut u64),
    /// Caller-supplied conversion function.
    Custom(fn(&ValueCtx<'_>, &str, &mut U) -> Result<(), ConfigError>),
}

impl<U> Clone for Convert<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for Convert<U> {}

impl<U> Convert<U> {
    /// Run the converter against one raw value.
    pub fn invoke(&self, ctx: &ValueCtx<'_>, rvalue: &str, userdata: &mut U) -> Result<(), ConfigError> {
        match self {
            Convert::String(field) => {
                *field(userdata) = rvalue.to_string();
                Ok(())
            }
            Convert::OptString(field) => {
                *field(userdata) = if rvalue.is_empty() {
                    None
                } else {
                    Some(rvalue.to_string())
                };
                Ok(())
            }
            Convert::Boolean(field) => {
                match parse_boolean(rvalue) {
                    Some(v) => *field(userdata) = v,
                    None => ctx.error(format!("Failed to parse boolean value, ignoring: {rvalue}")),
                }
                Ok(())
            }
            Convert::Unsigned(field) => {
                match rvalue.parse::<u64>() {
                    Ok(v) => *field(userdata) = v,
                    Err(_) => {
                        ctx.error(format!("Failed to parse unsigned value, ignoring: {rvalue}"))
                    }
                }
                Ok(())
            }
            Convert::Custom(f) => f(ctx, rvalue, userdata),
        }
    }
}

/// Parse a boolean token.
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value {
        "1" | "yes" | "y" | "true" | "t" | "on" => Some(true),
        "0" | "no" | "n" | "false" | "f" | "off" => Some(false),
        _ => None,
    }
}

/// Convert a single enum-valued setting via a name lookup.
///
/// On an unknown name the bad token is logged and the existing storage is
/// left unchanged.
pub fn enum_value<T>(
    ctx: &ValueCtx<'_>,
    rvalue: &str,
    from_name: fn(&str) -> Option<T>,
    what: &str,
    out: &mut T,
) {
    match from_name(rvalue) {
        Some(v) => *out = v,
        None => ctx.error(format!("Failed to parse {what}, ignoring: {rvalue}")),
    }
}

/// Convert a whitespace-separated list of enum names into a set.
///
/// Unknown tokens are logged and skipped. A token that resolves to a value
/// already present in the result being built is logged as a duplicate and
/// dropped, so surviving values keep first-occurrence order. The previous
/// stored sequence is only replaced once the new one is fully built.
pub fn enum_set<T: PartialEq>(
    ctx: &ValueCtx<'_>,
    rvalue: &str,
    from_name: fn(&str) -> Option<T>,
    what: &str,
    out: &mut Vec<T>,
) {
    let mut set = Vec::new();
    for word in rvalue.split_whitespace() {
        let Some(v) = from_name(word) else {
            ctx.error(format!("Failed to parse {what}, ignoring: {word}"));
            continue;
        };
        if set.contains(&v) {
            ctx.error(format!("Duplicate entry, ignoring: {word}"));
            continue;
        }
        set.push(v);
    }
    *out = set;
}

/// Generate a named [`Convert::Custom`]-compatible converter function for a
/// single enum-valued setting.
///
/// ```rust
/// use dropconf::{define_enum_converter, ConfigParser, ConfigTable, Convert};
///
/// #[derive(Default, PartialEq, Debug)]
/// enum Mode {
///     #[default]
///     Fast,
///     Safe,
/// }
///
/// impl Mode {
///     fn from_name(name: &str) -> Option<Self> {
///         match name {
///             "fast" => Some(Mode::Fast),
///             "safe" => Some(Mode::Safe),
///             _ => None,
///         }
///     }
/// }
///
/// #[derive(Default)]
/// struct Settings {
///     mode: Mode,
/// }
///
/// define_enum_converter!(parse_mode, Settings, Mode, Mode::from_name, "mode", |s| &mut s.mode);
///
/// let table = ConfigTable::new().item("Main", "Mode", 0, Convert::Custom(parse_mode));
/// let mut settings = Settings::default();
/// ConfigParser::new(&table)
///     .parse_stream("main.conf", "[Main]\nMode = safe\n".as_bytes(), &mut settings)
///     .unwrap();
/// assert_eq!(settings.mode, Mode::Safe);
/// ```
#[macro_export]
macro_rules! define_enum_converter {
    ($vis:vis $name:ident, $userdata:ty, $ty:ty, $from_name:path, $what:expr, $field:expr) => {
        $vis fn $name(
            ctx: &$crate::ValueCtx<'_>,
            rvalue: &str,
            userdata: &mut $userdata,
        ) -> ::core::result::Result<(), $crate::ConfigError> {
            let field: fn(&mut $userdata) -> &mut $ty = $field;
            $crate::convert::enum_value(ctx, rvalue, $from_name, $what, field(userdata));
            Ok(())
        }
    };
}

/// Generate a named [`Convert::Custom`]-compatible converter function for an
/// enum-set-valued setting stored as a `Vec`.
#[macro_export]
macro_rules! define_enum_set_converter {
    ($vis:vis $name:ident, $userdata:ty, $ty:ty, $from_name:path, $what:expr, $field:expr) => {
        $vis fn $name(
            ctx: &$crate::ValueCtx<'_>,
            rvalue: &str,
            userdata: &mut $userdata,
        ) -> ::core::result::Result<(), $crate::ConfigError> {
            let field: fn(&mut $userdata) -> &mut ::std::vec::Vec<$ty> = $field;
            $crate::convert::enum_set(ctx, rvalue, $from_name, $what, field(userdata));
            Ok(())
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Target {
        Console,
        Journal,
        Syslog,
    }

    impl Target {
        fn from_name(name: &str) -> Option<Self> {
            match name {
                "console" => Some(Target::Console),
                "journal" => Some(Target::Journal),
                "syslog" => Some(Target::Syslog),
                _ => None,
            }
        }
    }

    #[derive(Default)]
    struct Conf {
        name: String,
        alias: Option<String>,
        active: bool,
        limit: u64,
        target: Option<Target>,
        targets: Vec<Target>,
    }

    fn ctx<'a>() -> ValueCtx<'a> {
        ValueCtx {
            unit: None,
            filename: Path::new("test.conf"),
            line: 1,
            section: Some("Test"),
            section_line: 1,
            lvalue: "Key",
            ltype: 0,
        }
    }

    fn run(convert: Convert<Conf>, rvalue: &str, conf: &mut Conf) {
        convert.invoke(&ctx(), rvalue, conf).unwrap();
    }

    #[test]
    fn test_string() {
        let mut conf = Conf::default();
        run(Convert::String(|c| &mut c.name), "hello world", &mut conf);
        assert_eq!(conf.name, "hello world");

        // Empty values are assignments, not "absent".
        run(Convert::String(|c| &mut c.name), "", &mut conf);
        assert_eq!(conf.name, "");
    }

    #[test]
    fn test_opt_string_empty_resets() {
        let mut conf = Conf::default();
        run(Convert::OptString(|c| &mut c.alias), "short", &mut conf);
        assert_eq!(conf.alias.as_deref(), Some("short"));

        run(Convert::OptString(|c| &mut c.alias), "", &mut conf);
        assert_eq!(conf.alias, None);
    }

    #[test]
    fn test_boolean_tokens() {
        let mut conf = Conf::default();
        for token in ["1", "yes", "y", "true", "t", "on"] {
            conf.active = false;
            run(Convert::Boolean(|c| &mut c.active), token, &mut conf);
            assert!(conf.active, "token {token:?}");
        }
        for token in ["0", "no", "n", "false", "f", "off"] {
            conf.active = true;
            run(Convert::Boolean(|c| &mut c.active), token, &mut conf);
            assert!(!conf.active, "token {token:?}");
        }
    }

    #[test]
    fn test_boolean_invalid_keeps_previous() {
        let mut conf = Conf {
            active: true,
            ..Conf::default()
        };
        run(Convert::Boolean(|c| &mut c.active), "maybe", &mut conf);
        assert!(conf.active);
    }

    #[test]
    fn test_unsigned() {
        let mut conf = Conf::default();
        run(Convert::Unsigned(|c| &mut c.limit), "4096", &mut conf);
        assert_eq!(conf.limit, 4096);

        run(Convert::Unsigned(|c| &mut c.limit), "-1", &mut conf);
        assert_eq!(conf.limit, 4096);
    }

    #[test]
    fn test_enum_value_invalid_keeps_previous() {
        let mut conf = Conf {
            target: Some(Target::Console),
            ..Conf::default()
        };

        fn opt_from_name(name: &str) -> Option<Option<Target>> {
            Target::from_name(name).map(Some)
        }

        enum_value(&ctx(), "journal", opt_from_name, "target", &mut conf.target);
        assert_eq!(conf.target, Some(Target::Journal));

        enum_value(&ctx(), "nowhere", opt_from_name, "target", &mut conf.target);
        assert_eq!(conf.target, Some(Target::Journal));
    }

    #[test]
    fn test_enum_set_drops_duplicates() {
        let mut conf = Conf::default();
        enum_set(
            &ctx(),
            "console console journal",
            Target::from_name,
            "target",
            &mut conf.targets,
        );
        assert_eq!(conf.targets, vec![Target::Console, Target::Journal]);
    }

    #[test]
    fn test_enum_set_duplicate_diagnostic_logged_once() {
        crate::diag::capture::install();

        let dup_ctx = ValueCtx {
            unit: None,
            filename: Path::new("enumset-dup.conf"),
            line: 3,
            section: Some("Test"),
            section_line: 1,
            lvalue: "Targets",
            ltype: 0,
        };

        let mut targets = Vec::new();
        enum_set(
            &dup_ctx,
            "console console journal",
            Target::from_name,
            "target",
            &mut targets,
        );
        assert_eq!(targets, vec![Target::Console, Target::Journal]);

        let records = crate::diag::capture::records_matching("enumset-dup.conf");
        let duplicates: Vec<_> = records
            .iter()
            .filter(|(_, msg)| msg.contains("Duplicate entry"))
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert!(duplicates[0].1.contains("console"));

        // Distinct tokens emit no duplicate diagnostic at all.
        let ok_ctx = ValueCtx {
            filename: Path::new("enumset-ok.conf"),
            ..dup_ctx
        };
        enum_set(
            &ok_ctx,
            "console journal",
            Target::from_name,
            "target",
            &mut targets,
        );
        assert!(
            crate::diag::capture::records_matching("enumset-ok.conf").is_empty()
        );
    }

    #[test]
    fn test_enum_set_skips_invalid_and_keeps_order() {
        let mut conf = Conf::default();
        enum_set(
            &ctx(),
            "syslog bogus journal syslog",
            Target::from_name,
            "target",
            &mut conf.targets,
        );
        assert_eq!(conf.targets, vec![Target::Syslog, Target::Journal]);
    }

    #[test]
    fn test_enum_set_replaces_previous() {
        let mut conf = Conf {
            targets: vec![Target::Console],
            ..Conf::default()
        };
        enum_set(&ctx(), "journal", Target::from_name, "target", &mut conf.targets);
        assert_eq!(conf.targets, vec![Target::Journal]);
    }

    define_enum_set_converter!(
        parse_targets,
        Conf,
        Target,
        Target::from_name,
        "target",
        |c| &mut c.targets
    );

    #[test]
    fn test_generated_enum_set_converter() {
        let mut conf = Conf::default();
        Convert::Custom(parse_targets)
            .invoke(&ctx(), "journal console", &mut conf)
            .unwrap();
        assert_eq!(conf.targets, vec![Target::Journal, Target::Console]);
    }
}
