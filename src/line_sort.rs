//! Multi-key sorting of raw lines by byte ranges
//!
//! Keys are byte ranges inside each line, most significant first. Every key is
//! extracted once per line; lines shorter than a key are treated as if padded
//! with spaces, and empty lines produce empty keys.

use crate::field::Field;
use std::borrow::Cow;
use std::cmp::Ordering;

/// A `[start, start + size)` byte range within a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// 0-based offset
    pub start: usize,
    pub size: usize,
}

impl ByteRange {
    pub fn new(start: usize, size: usize) -> Self {
        Self { start, size }
    }

    /// One past the last byte; saturates instead of overflowing
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.size)
    }

    /// The key bytes of `line`, padding short lines with spaces
    pub fn extract<'a>(&self, line: &'a [u8]) -> Cow<'a, [u8]> {
        if line.is_empty() {
            return Cow::Borrowed(line);
        }
        let end = self.end();
        if line.len() >= end {
            return Cow::Borrowed(&line[self.start..end]);
        }
        let mut key = line[self.start.min(line.len())..].to_vec();
        key.resize(self.size, b' ');
        Cow::Owned(key)
    }
}

impl From<&Field> for ByteRange {
    fn from(field: &Field) -> Self {
        Self::new(field.start_index(), field.size())
    }
}

/// Sort order enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Stable multi-key line sorter
#[derive(Debug, Clone)]
pub struct LineSorter {
    keys: Vec<ByteRange>,
    order: SortOrder,
}

struct SortableLine<'a> {
    keys: Vec<Cow<'a, [u8]>>,
    original_index: usize,
}

impl LineSorter {
    pub fn new(keys: Vec<ByteRange>, order: SortOrder) -> Self {
        Self { keys, order }
    }

    /// Sort by the byte ranges the given fields occupy
    pub fn by_fields(fields: &[&Field], order: SortOrder) -> Self {
        Self::new(fields.iter().map(|&field| ByteRange::from(field)).collect(), order)
    }

    pub fn keys(&self) -> &[ByteRange] {
        &self.keys
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    fn extract_keys<'a>(&self, line: &'a [u8]) -> Vec<Cow<'a, [u8]>> {
        self.keys.iter().map(|key| key.extract(line)).collect()
    }

    /// Compare two lines key by key, honoring the sort order
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let cmp = self
            .keys
            .iter()
            .map(|key| key.extract(a).cmp(&key.extract(b)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal);
        self.order.apply(cmp)
    }

    /// Stable sort; lines with equal keys keep their input order. Lines are
    /// compared as raw bytes, so any single-byte encoding sorts the same way.
    pub fn sort_lines<S: AsRef<[u8]> + Clone>(&self, lines: &[S]) -> Vec<S> {
        let mut sortable: Vec<SortableLine<'_>> = lines
            .iter()
            .enumerate()
            .map(|(original_index, line)| SortableLine {
                keys: self.extract_keys(line.as_ref()),
                original_index,
            })
            .collect();

        sortable.sort_by(|a, b| self.order.apply(a.keys.cmp(&b.keys)));

        tracing::debug!(lines = lines.len(), keys = self.keys.len(), "sorted lines");
        sortable
            .into_iter()
            .map(|entry| lines[entry.original_index].clone())
            .collect()
    }

    /// Split `text` on `terminator`, sort, and join with the same terminator.
    /// A single trailing terminator is preserved.
    pub fn sort_text(&self, text: &str, terminator: char) -> String {
        let body = text.strip_suffix(terminator).unwrap_or(text);
        if body.is_empty() {
            return text.to_string();
        }
        let lines: Vec<&str> = body.split(terminator).collect();
        let separator = terminator.to_string();
        let mut out = self.sort_lines(&lines).join(separator.as_str());
        if body.len() != text.len() {
            out.push(terminator);
        }
        out
    }

    /// 1-based number of the first line that is out of order, if any
    pub fn first_disorder<S: AsRef<[u8]>>(&self, lines: &[S]) -> Option<usize> {
        lines
            .windows(2)
            .position(|pair| self.compare(pair[0].as_ref(), pair[1].as_ref()) == Ordering::Greater)
            .map(|index| index + 2)
    }
}
