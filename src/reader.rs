//! Logical line assembly.
//!
//! A logical line is a run of physical lines where all but the last end in
//! a backslash immediately before the line terminator. The marker and the
//! terminator are removed and the following physical line is appended
//! directly, so joining is exact: `"a\"` + `"b"` becomes `"ab"`, with no
//! inserted whitespace. The final logical line is trimmed.
//!
//! Blank logical lines and logical lines whose first non-whitespace
//! character is `#` or `;` are dropped inside the reader and never reach
//! the dispatcher.

use std::io::{self, BufRead};

/// Streams logical lines from a character stream, tracking line numbers
/// for diagnostics.
///
/// The sequence is finite and driven by end of stream; a reader is not
/// restartable, callers re-open the source to re-read it.
pub struct LineReader<R> {
    source: R,
    line: u32,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(source: R) -> Self {
        Self { source, line: 0 }
    }

    /// Physical line number of the last line consumed.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Read the next logical line together with its starting physical line
    /// number. Returns `Ok(None)` at end of stream.
    ///
    /// End of stream in the middle of a continuation is accepted and
    /// yields the partial line.
    pub fn next_logical(&mut self) -> io::Result<Option<(u32, String)>> {
        loop {
            let mut logical = String::new();
            let mut start = 0u32;

            loop {
                let mut physical = String::new();
                if self.source.read_line(&mut physical)? == 0 {
                    if start == 0 {
                        return Ok(None);
                    }
                    break;
                }
                self.line += 1;
                if start == 0 {
                    start = self.line;
                }

                trim_terminator(&mut physical);
                match physical.strip_suffix('\\') {
                    Some(stripped) => logical.push_str(stripped),
                    None => {
                        logical.push_str(&physical);
                        break;
                    }
                }
            }

            let trimmed = logical.trim();
            if trimmed.is_empty() || trimmed.starts_with(['#', ';']) {
                continue;
            }
            return Ok(Some((start, trimmed.to_string())));
        }
    }
}

fn trim_terminator(s: &mut String) {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str) -> Vec<(u32, String)> {
        let mut reader = LineReader::new(input.as_bytes());
        let mut out = Vec::new();
        while let Some(line) = reader.next_logical().unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn test_plain_lines() {
        let lines = collect("a = 1\nb = 2\n");
        assert_eq!(
            lines,
            vec![(1, "a = 1".to_string()), (2, "b = 2".to_string())]
        );
    }

    #[test]
    fn test_continuation_joins_exactly() {
        // No separator is inserted at the join point.
        let lines = collect("a\\\nb\n");
        assert_eq!(lines, vec![(1, "ab".to_string())]);
    }

    #[test]
    fn test_continuation_line_numbers() {
        let lines = collect("x = 1\nkey = a\\\nb\\\nc\nnext = 2\n");
        assert_eq!(
            lines,
            vec![
                (1, "x = 1".to_string()),
                (2, "key = abc".to_string()),
                (5, "next = 2".to_string()),
            ]
        );
    }

    #[test]
    fn test_eof_mid_continuation_yields_partial_line() {
        let lines = collect("key = value\\");
        assert_eq!(lines, vec![(1, "key = value".to_string())]);

        let lines = collect("key = value\\\n");
        assert_eq!(lines, vec![(1, "key = value".to_string())]);
    }

    #[test]
    fn test_comments_and_blanks_are_dropped() {
        let lines = collect("# comment\n; other comment\n\n   \n  # indented\nkey = 1\n");
        assert_eq!(lines, vec![(6, "key = 1".to_string())]);
    }

    #[test]
    fn test_crlf_terminators() {
        let lines = collect("a = 1\r\nb = x\\\r\ny\r\n");
        assert_eq!(
            lines,
            vec![(1, "a = 1".to_string()), (2, "b = xy".to_string())]
        );
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let lines = collect("  key = value  \n");
        assert_eq!(lines, vec![(1, "key = value".to_string())]);
    }

    #[test]
    fn test_empty_stream() {
        assert!(collect("").is_empty());
    }
}
