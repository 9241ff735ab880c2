//! Sorting and checking whole files of fixed-width records
//!
//! Inputs are handled as raw bytes end to end, so single-byte legacy
//! encodings pass through unchanged.

use crate::config::SortConfig;
use crate::error::{RecordContext, RecordResult};
use crate::line_sort::LineSorter;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

/// File-level driver around [`LineSorter`]
pub struct FileSort {
    config: SortConfig,
    sorter: LineSorter,
}

impl FileSort {
    pub fn new(config: SortConfig) -> Self {
        let sorter = config.sorter();
        Self { config, sorter }
    }

    /// Sort (or check) the configured inputs and return the exit code
    pub fn run(&self) -> RecordResult<i32> {
        if self.config.check {
            return self.check_sorted();
        }
        self.sort()
    }

    fn sources(&self) -> Vec<String> {
        if self.config.reading_from_stdin() {
            vec!["-".to_string()]
        } else {
            self.config.input_files.clone()
        }
    }

    fn read_source(name: &str) -> RecordResult<Vec<u8>> {
        if name == "-" {
            let mut data = Vec::new();
            io::stdin().lock().read_to_end(&mut data)?;
            return Ok(data);
        }
        std::fs::read(name).with_file_context(name)
    }

    fn split_lines(data: &[u8], terminator: u8) -> Vec<&[u8]> {
        if data.is_empty() {
            return Vec::new();
        }
        let body = data.strip_suffix(&[terminator]).unwrap_or(data);
        body.split(|&byte| byte == terminator).collect()
    }

    fn sort(&self) -> RecordResult<i32> {
        let terminator = self.config.line_terminator();
        let contents = self
            .sources()
            .iter()
            .map(|name| Self::read_source(name))
            .collect::<RecordResult<Vec<_>>>()?;
        let lines: Vec<&[u8]> = contents
            .iter()
            .flat_map(|data| Self::split_lines(data, terminator))
            .collect();

        let sorted = self.sorter.sort_lines(&lines);
        self.write_output(&sorted)?;
        Ok(crate::EXIT_SUCCESS)
    }

    /// Report the first disorder per input, GNU sort style
    fn check_sorted(&self) -> RecordResult<i32> {
        let terminator = self.config.line_terminator();
        for name in self.sources() {
            let data = Self::read_source(&name)?;
            let lines = Self::split_lines(&data, terminator);
            if let Some(line) = self.sorter.first_disorder(&lines) {
                eprintln!("recsort: {name}:{line}: disorder");
                return Ok(crate::EXIT_FAILURE);
            }
            tracing::debug!(input = %name, lines = lines.len(), "input is sorted");
        }
        Ok(crate::EXIT_SUCCESS)
    }

    fn write_output(&self, lines: &[&[u8]]) -> RecordResult<()> {
        let mut output: Box<dyn Write> = if let Some(output_file) = &self.config.output_file {
            Box::new(BufWriter::new(
                File::create(output_file).with_file_context(output_file)?,
            ))
        } else {
            Box::new(BufWriter::new(io::stdout()))
        };

        let terminator = [self.config.line_terminator()];
        for line in lines {
            output.write_all(line)?;
            output.write_all(&terminator)?;
        }

        output.flush()?;
        Ok(())
    }
}
