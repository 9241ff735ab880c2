//! Group items: ordered composites of fields and nested groups
//!
//! Construction is the only point where offsets are assigned. Decoding with
//! [`Group::set`] walks the members in declaration order, handing each one the
//! next `size` characters of the input.
//!
//! Sizes and offsets count characters, which equal bytes only for single-byte
//! text. Records read from files should go through [`Group::set_bytes`] and
//! [`Group::encode_bytes`], which treat every byte as one Latin-1 character so
//! field boundaries line up with the byte ranges [`crate::LineSorter`] sorts on.

use crate::error::{RecordError, RecordResult};
use crate::field::Field;
use crate::value::ValueKind;
use std::cell::Cell;
use std::fmt;

/// How a group assigns offsets to the fields that follow a nested group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutRule {
    /// Offsets continue past nested groups and are absolute within the
    /// outermost record
    #[default]
    Continuous,
    /// The running offset drops back to zero after every nested group and
    /// nested members keep offsets relative to their own group
    ResetAfterGroup,
}

/// A member of a group
#[derive(Debug)]
pub enum Item {
    Field(Field),
    Group(Group),
}

impl Item {
    pub fn size(&self) -> usize {
        match self {
            Item::Field(field) => field.size(),
            Item::Group(group) => group.size(),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Item::Field(field) => field.render(),
            Item::Group(group) => group.render(),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Item::Field(field) => field.encode(),
            Item::Group(group) => group.encode(),
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Item::Field(field) => Some(field),
            Item::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Item::Group(group) => Some(group),
            Item::Field(_) => None,
        }
    }
}

impl From<Field> for Item {
    fn from(field: Field) -> Self {
        Item::Field(field)
    }
}

impl From<&Field> for Item {
    fn from(field: &Field) -> Self {
        Item::Field(field.clone())
    }
}

impl From<Group> for Item {
    fn from(group: Group) -> Self {
        Item::Group(group)
    }
}

/// A group item
#[derive(Debug)]
pub struct Group {
    members: Vec<Item>,
    rule: LayoutRule,
    bound: Cell<bool>,
}

impl Group {
    /// Build a group with [`LayoutRule::Continuous`] offsets
    pub fn new(members: impl IntoIterator<Item = Item>) -> Self {
        Self::with_rule(members, LayoutRule::Continuous)
    }

    pub fn with_rule(members: impl IntoIterator<Item = Item>, rule: LayoutRule) -> Self {
        let members: Vec<Item> = members.into_iter().collect();
        let mut offset = 0;
        for member in &members {
            match member {
                Item::Field(field) => {
                    field.set_start_index(offset);
                    offset += field.size();
                }
                Item::Group(group) => match rule {
                    LayoutRule::Continuous => {
                        group.shift(offset);
                        offset += group.size();
                    }
                    LayoutRule::ResetAfterGroup => offset = 0,
                },
            }
        }
        Self {
            members,
            rule,
            bound: Cell::new(false),
        }
    }

    fn shift(&self, by: usize) {
        for member in &self.members {
            match member {
                Item::Field(field) => field.shift_start_index(by),
                Item::Group(group) => group.shift(by),
            }
        }
    }

    pub fn rule(&self) -> LayoutRule {
        self.rule
    }

    /// Total width of all members, recursively
    pub fn size(&self) -> usize {
        self.members.iter().map(Item::size).sum()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True once [`Group::set`] or [`Group::fill`] has run
    pub fn is_bound(&self) -> bool {
        self.bound.get()
    }

    pub fn members(&self) -> impl Iterator<Item = &Item> {
        self.members.iter()
    }

    /// Direct member at `index`
    pub fn get_item(&self, index: usize) -> RecordResult<&Item> {
        self.members.get(index).ok_or(RecordError::IndexOutOfRange {
            index,
            len: self.members.len(),
        })
    }

    /// Every leaf field, depth first
    pub fn fields(&self) -> Vec<Field> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<Field>) {
        for member in &self.members {
            match member {
                Item::Field(field) => out.push(field.clone()),
                Item::Group(group) => group.collect_fields(out),
            }
        }
    }

    /// Decode the text form of `value` into the members
    pub fn set(&self, value: impl fmt::Display) {
        self.distribute(&value.to_string(), false);
    }

    /// Like [`Group::set`], but each text member is filled with the first
    /// character of its slice
    pub fn fill(&self, value: impl fmt::Display) {
        self.distribute(&value.to_string(), true);
    }

    /// Decode a raw record, one character per byte
    pub fn set_bytes(&self, record: &[u8]) {
        let text: String = record.iter().copied().map(char::from).collect();
        self.distribute(&text, false);
    }

    fn distribute(&self, text: &str, fill: bool) {
        self.bound.set(true);
        let mut chars: Vec<char> = text.chars().collect();
        let size = self.size();
        if chars.len() < size {
            chars.resize(size, ' ');
        }

        let mut rest: &[char] = &chars;
        for member in &self.members {
            if rest.is_empty() {
                return;
            }
            // an indicator ends the fan-out
            if let Item::Field(field) = member {
                if field.kind() == ValueKind::Boolean {
                    field.refresh();
                    return;
                }
            }
            let (head, tail) = rest.split_at(member.size().min(rest.len()));
            let piece: String = head.iter().collect();
            match member {
                Item::Field(field) if fill => field.fill(piece),
                Item::Field(field) => field.set(piece),
                Item::Group(group) => group.distribute(&piece, fill),
            }
            rest = tail;
        }
    }

    /// Concatenated rendering of every member
    pub fn render(&self) -> String {
        self.members.iter().map(Item::render).collect()
    }

    pub fn value(&self) -> String {
        self.render()
    }

    /// Fixed-width record image, exactly [`Group::size`] characters long
    pub fn encode(&self) -> String {
        self.members.iter().map(Item::encode).collect()
    }

    /// [`Group::encode`] as Latin-1 bytes; characters outside it become `?`
    pub fn encode_bytes(&self) -> Vec<u8> {
        self.encode()
            .chars()
            .map(|c| u8::try_from(c).unwrap_or(b'?'))
            .collect()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}

impl PartialEq<str> for Group {
    fn eq(&self, other: &str) -> bool {
        self.render() == other
    }
}

impl PartialEq<&str> for Group {
    fn eq(&self, other: &&str) -> bool {
        self.render() == *other
    }
}
