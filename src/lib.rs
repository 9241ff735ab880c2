//! Fixed-width record layouts in Rust
//!
//! This crate models the record layouts of legacy business-data languages:
//! flat text records subdivided into elementary items ([`Field`]) and group
//! items ([`Group`]), each with a declared width. Groups assign offsets,
//! decode fixed-width text into their fields and encode it back, and
//! [`LineSorter`] orders raw record lines by the byte ranges fields occupy.
//!
//! ```
//! use record_layout::{Field, Group, LineSorter, SortOrder};
//!
//! let name = Field::new("", 5);
//! let qty = Field::new(0, 3);
//! let record = Group::new([(&name).into(), (&qty).into()]);
//!
//! record.set("BOLTS042");
//! assert_eq!(name, "BOLTS");
//! assert_eq!(qty, 42);
//!
//! let sorter = LineSorter::by_fields(&[&qty], SortOrder::Ascending);
//! assert_eq!(sorter.sort_lines(&["NUTS 100", "BOLTS042"]), vec!["BOLTS042", "NUTS 100"]);
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod config;

// Record model
pub mod value;
pub mod predicates;
pub mod field;
pub mod group;

// Sorting
pub mod line_sort;
pub mod file_sort;

// Re-export commonly used types
pub use error::{RecordError, RecordResult};
pub use config::{SortConfig, SortConfigBuilder};
pub use field::Field;
pub use group::{Group, Item, LayoutRule};
pub use line_sort::{ByteRange, LineSorter, SortOrder};
pub use value::{Value, ValueKind};

/// Exit codes matching GNU sort
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const SORT_FAILURE: i32 = 2;

/// Main sort function that processes input according to configuration
pub fn sort(config: &SortConfig) -> RecordResult<i32> {
    config.validate()?;
    file_sort::FileSort::new(config.clone()).run()
}
