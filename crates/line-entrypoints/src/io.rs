//! Where records come from and where results go.

use crate::{DriverError, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Cursor, Write};
use std::path::PathBuf;

/// Default separator substituted for newlines in an input string
pub const DEFAULT_LINE_SEPARATOR: char = ';';

/// A configured source of input lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    /// In-memory text whose `separator` characters stand for line breaks
    Text { text: String, separator: char },
}

impl InputSource {
    /// Pick the source from the `--input-string`, `--input-file` and `--line-separator` options
    ///
    /// A file name of `-` means standard input.
    pub fn from_args(
        input_string: Option<String>,
        input_file: Option<String>,
        line_separator: &str,
    ) -> Result<Self> {
        let mut chars = line_separator.chars();
        let separator = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(DriverError::LineSeparator(line_separator.to_string())),
        };
        match (input_string, input_file) {
            (Some(_), Some(_)) => Err(DriverError::ConflictingInputs),
            (Some(text), None) => Ok(InputSource::Text { text, separator }),
            (None, Some(file)) if file != "-" => Ok(InputSource::File(PathBuf::from(file))),
            (None, _) => Ok(InputSource::Stdin),
        }
    }

    /// Open the source for line-by-line reading
    pub fn open(self) -> Result<Box<dyn BufRead>> {
        Ok(match self {
            InputSource::Stdin => Box::new(io::stdin().lock()),
            InputSource::File(path) => {
                let file = File::open(&path).map_err(|source| DriverError::OpenInput {
                    path: path.display().to_string(),
                    source,
                })?;
                Box::new(BufReader::new(file))
            }
            InputSource::Text { text, separator } => {
                let text: String = text
                    .chars()
                    .map(|c| if c == separator { '\n' } else { c })
                    .collect();
                Box::new(Cursor::new(text.into_bytes()))
            }
        })
    }
}

/// A configured destination for output lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    Stdout,
    File(PathBuf),
}

impl OutputSink {
    /// Pick the sink from the `--output-file` option; `-` means standard output
    pub fn from_arg(output_file: Option<String>) -> Self {
        match output_file {
            Some(file) if file != "-" => OutputSink::File(PathBuf::from(file)),
            _ => OutputSink::Stdout,
        }
    }

    /// Open the sink for buffered writing
    pub fn open(&self) -> Result<Box<dyn Write>> {
        Ok(match self {
            OutputSink::Stdout => Box::new(BufWriter::new(io::stdout().lock())),
            OutputSink::File(path) => {
                let file = File::create(path).map_err(|source| DriverError::OpenOutput {
                    path: path.display().to_string(),
                    source,
                })?;
                Box::new(BufWriter::new(file))
            }
        })
    }
}
