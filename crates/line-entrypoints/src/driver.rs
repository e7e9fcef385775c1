//! The per-line loop: split off a trailing comment, tokenize, hand the record
//! to a [`LineHandler`], and write exactly one output line per input line.
//!
//! A failing record produces an `ERROR: <message>` line and the loop moves on;
//! a line that is not valid UTF-8 fails the same way. Only I/O failures end
//! the run early.

use crate::Result;
use crate::format::FormatConfig;
use std::fmt::Display;
use std::io::{BufRead, Write};

/// A line with its trailing comment split off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLine<'a> {
    /// Text before the comment delimiter
    pub body: &'a str,
    /// The delimiter and everything after it
    pub comment: Option<&'a str>,
}

impl SplitLine<'_> {
    /// Line ending that re-attaches the comment after a single space
    pub fn line_end(&self) -> String {
        match self.comment {
            Some(comment) => format!(" {comment}\n"),
            None => "\n".to_string(),
        }
    }
}

/// Split `line` at the first occurrence of `delimiter`
pub fn split_comment<'a>(line: &'a str, delimiter: Option<&str>) -> SplitLine<'a> {
    match delimiter
        .filter(|d| !d.is_empty())
        .and_then(|d| line.find(d))
    {
        Some(at) => SplitLine {
            body: &line[..at],
            comment: Some(&line[at..]),
        },
        None => SplitLine {
            body: line,
            comment: None,
        },
    }
}

/// Split a record body into exactly two whitespace-separated tokens
pub fn tokenize(body: &str) -> std::result::Result<[&str; 2], String> {
    let mut tokens = body.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(a), Some(b), None) => Ok([a, b]),
        (Some(_), Some(_), Some(extra)) => Err(format!("Extraneous input: {extra}")),
        _ => Err(format!("Incomplete input: {body}")),
    }
}

/// Drop a trailing `\n` or `\r\n`
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Turns one record into the text of its output line
pub trait LineHandler {
    type Error: Display;

    /// Produce the output for a record of two tokens, without the line ending
    fn handle(&self, tokens: [&str; 2], format: &FormatConfig) -> std::result::Result<String, Self::Error>;
}

/// Result of processing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The complete output line, comment and line ending included
    Output(String),
    /// The record failed with this message
    Failed(String),
}

impl RecordOutcome {
    /// Text written for this outcome
    pub fn render(&self) -> String {
        match self {
            RecordOutcome::Output(line) => line.clone(),
            RecordOutcome::Failed(message) => format!("ERROR: {message}\n"),
        }
    }
}

/// Counters of one driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub records: usize,
    pub failures: usize,
}

impl RunStats {
    /// 0 when every record succeeded, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.failures > 0 { 1 } else { 0 }
    }
}

/// Drives a [`LineHandler`] over every line of an input
#[derive(Debug, Clone, Default)]
pub struct LineDriver {
    format: FormatConfig,
    comment_delimiter: Option<String>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl LineDriver {
    pub fn new(format: FormatConfig) -> Self {
        Self {
            format,
            comment_delimiter: None,
        }
    }

    /// Echo text from `delimiter` on verbatim after each result
    pub fn with_comment_delimiter(mut self, delimiter: Option<String>) -> Self {
        self.comment_delimiter = delimiter.filter(|d| !d.is_empty());
        self
    }

    pub fn format(&self) -> &FormatConfig {
        &self.format
    }

    /// Process a single input line
    pub fn process_line<H: LineHandler>(&self, handler: &H, line: &str) -> RecordOutcome {
        let split = split_comment(line, self.comment_delimiter.as_deref());
        let tokens = match tokenize(split.body) {
            Ok(tokens) => tokens,
            Err(message) => return RecordOutcome::Failed(message),
        };
        match handler.handle(tokens, &self.format) {
            Ok(text) => RecordOutcome::Output(text + &split.line_end()),
            Err(err) => RecordOutcome::Failed(err.to_string()),
        }
    }

    /// Process every line of `input`, writing one line per input line to `output`
    pub fn run<H, R, W>(&self, handler: &H, mut input: R, output: &mut W) -> Result<RunStats>
    where
        H: LineHandler,
        R: BufRead,
        W: Write + ?Sized,
    {
        let mut stats = RunStats::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            stats.records += 1;
            let outcome = match std::str::from_utf8(trim_line_ending(&buf)) {
                Ok(line) => self.process_line(handler, line),
                Err(_) => RecordOutcome::Failed("Input line is not valid UTF-8".to_string()),
            };
            if let RecordOutcome::Failed(message) = &outcome {
                tracing::debug!(line = stats.records, %message, "Record failed");
                stats.failures += 1;
            }
            output.write_all(outcome.render().as_bytes())?;
        }
        output.flush()?;
        tracing::info!(records = stats.records, failures = stats.failures, "Input exhausted");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Precision, format_fixed};
    use std::io::Cursor;

    /// Sums two numbers
    struct Adder;

    impl LineHandler for Adder {
        type Error = String;

        fn handle(&self, [a, b]: [&str; 2], format: &FormatConfig) -> std::result::Result<String, String> {
            let a: f64 = a.parse().map_err(|_| format!("Cannot decode {a}"))?;
            let b: f64 = b.parse().map_err(|_| format!("Cannot decode {b}"))?;
            Ok(format_fixed(a + b, format.precision.digits()))
        }
    }

    fn driver() -> LineDriver {
        LineDriver::new(FormatConfig {
            precision: Precision::clamped(1),
            longfirst: false,
        })
        .with_comment_delimiter(Some("#".to_string()))
    }

    #[test]
    fn test_split_comment() {
        let split = split_comment("1.0 2.0 # note", Some("#"));
        assert_eq!(split.body, "1.0 2.0 ");
        assert_eq!(split.comment, Some("# note"));
        assert_eq!(split.line_end(), " # note\n");

        let plain = split_comment("1.0 2.0 # note", None);
        assert_eq!(plain.body, "1.0 2.0 # note");
        assert_eq!(plain.line_end(), "\n");

        let multi = split_comment("1 2 // a // b", Some("//"));
        assert_eq!(multi.comment, Some("// a // b"));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  33  -96 "), Ok(["33", "-96"]));
        assert_eq!(tokenize("33"), Err("Incomplete input: 33".to_string()));
        assert_eq!(tokenize(""), Err("Incomplete input: ".to_string()));
        assert_eq!(tokenize("1 2 3 4"), Err("Extraneous input: 3".to_string()));
    }

    #[test]
    fn test_comment_pass_through() {
        let outcome = driver().process_line(&Adder, "1.0 2.0 # note");
        assert_eq!(outcome, RecordOutcome::Output("3.0 # note\n".to_string()));
    }

    #[test]
    fn test_failures_do_not_stop_the_run() {
        let input = Cursor::new("1 2\nx 2 # dropped\n3\n4 5 # kept\n");
        let mut output = Vec::new();
        let stats = driver().run(&Adder, input, &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "3.0\nERROR: Cannot decode x\nERROR: Incomplete input: 3\n9.0 # kept\n"
        );
        assert_eq!(stats, RunStats { records: 4, failures: 2 });
        assert_eq!(stats.exit_code(), 1);
    }

    #[test]
    fn test_invalid_utf8_line_is_a_record_failure() {
        let input = Cursor::new(&b"1 2\n\xff\xfe 3\r\n4 5\r\n6 7"[..]);
        let mut output = Vec::new();
        let stats = driver().run(&Adder, input, &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "3.0\nERROR: Input line is not valid UTF-8\n9.0\n13.0\n"
        );
        assert_eq!(stats, RunStats { records: 4, failures: 1 });
    }

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending(b"1 2\r\n"), b"1 2");
        assert_eq!(trim_line_ending(b"1 2\n"), b"1 2");
        assert_eq!(trim_line_ending(b"1 2"), b"1 2");
        assert_eq!(trim_line_ending(b"\n"), b"");
    }

    #[test]
    fn test_clean_run_exit_code() {
        let mut output = Vec::new();
        let stats = driver().run(&Adder, Cursor::new("1 1"), &mut output).unwrap();
        assert_eq!(stats.exit_code(), 0);
        assert_eq!(output, b"2.0\n");
    }
}
