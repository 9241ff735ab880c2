//! Configuration management for record sort operations

use crate::error::{RecordError, RecordResult};
use crate::line_sort::{ByteRange, LineSorter, SortOrder};

/// Longest record a key may reach into, in bytes
pub const MAX_RECORD_LENGTH: usize = 32_760;

/// Parse a key specification like "1,4" (1-based position, length)
pub fn parse_key_spec(spec: &str) -> RecordResult<ByteRange> {
    let (position, length) = spec
        .split_once(',')
        .ok_or_else(|| RecordError::invalid_key_spec(spec))?;

    let position = position
        .trim()
        .parse::<usize>()
        .map_err(|_| RecordError::invalid_key_spec(spec))?;
    let length = length
        .trim()
        .parse::<usize>()
        .map_err(|_| RecordError::invalid_key_spec(spec))?;

    if position == 0 {
        return Err(RecordError::invalid_key_spec(&format!(
            "{spec} (positions start at 1)"
        )));
    }
    if length == 0 {
        return Err(RecordError::invalid_key_spec(&format!(
            "{spec} (length must be positive)"
        )));
    }

    let start = position - 1;
    match start.checked_add(length) {
        Some(end) if end <= MAX_RECORD_LENGTH => Ok(ByteRange::new(start, length)),
        _ => Err(RecordError::invalid_key_spec(&format!(
            "{spec} (key must end within {MAX_RECORD_LENGTH} bytes)"
        ))),
    }
}

/// Main configuration structure for sort operations
#[derive(Debug, Clone, Default)]
pub struct SortConfig {
    /// Sort keys, most significant first
    pub keys: Vec<ByteRange>,
    /// Sort descending
    pub reverse: bool,
    /// Check if input is already sorted
    pub check: bool,
    /// Use zero bytes as line terminators instead of newlines
    pub zero_terminated: bool,
    /// Output file path
    pub output_file: Option<String>,
    /// Files to read from (if not specified, use stdin)
    pub input_files: Vec<String>,
    /// Debug logging
    pub debug: bool,
}

impl SortConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sort key
    pub fn add_key(mut self, key: ByteRange) -> Self {
        self.keys.push(key);
        self
    }

    /// Enable reverse sorting
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Enable check mode
    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Enable zero-terminated lines
    pub fn with_zero_terminated(mut self, zero_terminated: bool) -> Self {
        self.zero_terminated = zero_terminated;
        self
    }

    /// Set output file
    pub fn with_output_file(mut self, output_file: Option<String>) -> Self {
        self.output_file = output_file;
        self
    }

    /// Set input files
    pub fn with_input_files(mut self, files: Vec<String>) -> Self {
        self.input_files = files;
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> RecordResult<()> {
        if self.keys.is_empty() {
            return Err(RecordError::conflicting_options(
                "at least one --key is required",
            ));
        }

        if let Some(key) = self.keys.iter().find(|key| key.size == 0) {
            return Err(RecordError::invalid_key_spec(&format!(
                "{},{}",
                key.start + 1,
                key.size
            )));
        }

        if self.check && self.output_file.is_some() {
            return Err(RecordError::conflicting_options(
                "--check does not write output",
            ));
        }

        Ok(())
    }

    /// Get the effective sort order
    pub fn sort_order(&self) -> SortOrder {
        if self.reverse {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn line_terminator(&self) -> u8 {
        if self.zero_terminated {
            b'\0'
        } else {
            b'\n'
        }
    }

    /// Check if reading from stdin
    pub fn reading_from_stdin(&self) -> bool {
        self.input_files.is_empty() || (self.input_files.len() == 1 && self.input_files[0] == "-")
    }

    /// Check if writing to stdout
    pub fn writing_to_stdout(&self) -> bool {
        self.output_file.is_none()
    }

    pub fn sorter(&self) -> LineSorter {
        LineSorter::new(self.keys.clone(), self.sort_order())
    }
}

/// Builder pattern for creating configurations
#[derive(Default)]
pub struct SortConfigBuilder {
    config: SortConfig,
}

impl SortConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sort key
    pub fn key(mut self, key: ByteRange) -> Self {
        self.config.keys.push(key);
        self
    }

    /// Enable reverse sorting
    pub fn reverse(mut self) -> Self {
        self.config.reverse = true;
        self
    }

    /// Enable check mode
    pub fn check(mut self) -> Self {
        self.config.check = true;
        self
    }

    /// Enable zero-terminated lines
    pub fn zero_terminated(mut self) -> Self {
        self.config.zero_terminated = true;
        self
    }

    /// Set output file
    pub fn output_file(mut self, file: String) -> Self {
        self.config.output_file = Some(file);
        self
    }

    pub fn input_files(mut self, files: Vec<String>) -> Self {
        self.config.input_files = files;
        self
    }

    pub fn debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> RecordResult<SortConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
