//! Elementary items: a typed value with a declared width
//!
//! A [`Field`] is a shared handle. Composing it into a [`Group`](crate::Group)
//! keeps the caller's handle valid, so a record can be filled through its
//! fields and read back through the group (or the other way round). Cloning a
//! `Field` clones the handle, not the storage.

use crate::error::{RecordError, RecordResult};
use crate::predicates;
use crate::value::{Value, ValueKind};
use itertools::Itertools;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Predicate = Rc<dyn Fn(&Field) -> RecordResult<bool>>;

/// Derived boolean: a predicate over another field, held weakly
#[derive(Clone)]
struct Condition {
    owner: Weak<RefCell<FieldCell>>,
    predicate: Predicate,
}

struct FieldCell {
    value: Value,
    size: usize,
    start_index: usize,
    occurs: u32,
    condition: Option<Condition>,
}

/// A leaf record element
#[derive(Clone)]
pub struct Field {
    cell: Rc<RefCell<FieldCell>>,
}

impl Field {
    /// Create a field whose variant is fixed by `value`
    pub fn new(value: impl Into<Value>, size: usize) -> Self {
        Self::from_cell(FieldCell {
            value: value.into(),
            size,
            start_index: 0,
            occurs: 1,
            condition: None,
        })
    }

    /// Repeat the printed value `occurs` times when rendering (minimum 1)
    pub fn with_occurs(self, occurs: u32) -> Self {
        self.cell.borrow_mut().occurs = occurs.max(1);
        self
    }

    /// Create a condition field whose value is always `predicate(owner)`
    pub fn condition<P>(owner: &Field, size: usize, predicate: P) -> Self
    where
        P: Fn(&Field) -> bool + 'static,
    {
        Self::try_condition(owner, size, move |field| Ok(predicate(field)))
    }

    /// Like [`Field::condition`] for predicates that can fail.
    ///
    /// A failing predicate never aborts the caller: the failure is logged and
    /// the field keeps its previous value (`false` if it never succeeded).
    pub fn try_condition<P>(owner: &Field, size: usize, predicate: P) -> Self
    where
        P: Fn(&Field) -> RecordResult<bool> + 'static,
    {
        let field = Self::from_cell(FieldCell {
            value: Value::Boolean(false),
            size,
            start_index: 0,
            occurs: 1,
            condition: Some(Condition {
                owner: Rc::downgrade(&owner.cell),
                predicate: Rc::new(predicate),
            }),
        });
        field.refresh();
        field
    }

    fn from_cell(cell: FieldCell) -> Self {
        Self {
            cell: Rc::new(RefCell::new(cell)),
        }
    }

    /// True for condition fields
    pub fn is_bool(&self) -> bool {
        self.cell.borrow().condition.is_some()
    }

    pub fn kind(&self) -> ValueKind {
        self.cell.borrow().value.kind()
    }

    pub fn size(&self) -> usize {
        self.cell.borrow().size
    }

    /// Offset assigned by the enclosing group at construction
    pub fn start_index(&self) -> usize {
        self.cell.borrow().start_index
    }

    pub(crate) fn set_start_index(&self, start_index: usize) {
        self.cell.borrow_mut().start_index = start_index;
    }

    pub(crate) fn shift_start_index(&self, by: usize) {
        self.cell.borrow_mut().start_index += by;
    }

    pub fn occurs(&self) -> u32 {
        self.cell.borrow().occurs
    }

    /// Current value; condition fields are re-evaluated first
    pub fn value(&self) -> Value {
        self.refresh();
        self.cell.borrow().value.clone()
    }

    /// Re-evaluate a condition field, logging (not returning) any failure
    pub fn refresh(&self) {
        if let Err(err) = self.try_refresh() {
            tracing::warn!(error = %err, "condition evaluation failed, keeping previous value");
        }
    }

    /// Re-evaluate a condition field. On failure the previous value is kept.
    pub fn try_refresh(&self) -> RecordResult<()> {
        let Some(condition) = self.cell.borrow().condition.clone() else {
            return Ok(());
        };
        let owner = condition
            .owner
            .upgrade()
            .map(|cell| Field { cell })
            .ok_or_else(|| RecordError::condition_failure("owner field no longer exists"))?;
        let outcome = (condition.predicate)(&owner)?;
        self.cell.borrow_mut().value = Value::Boolean(outcome);
        Ok(())
    }

    /// Assign a new value, coerced into this field's variant.
    ///
    /// Text is stored as given. Numeric fields parse leniently: input that is
    /// not a number stores zero. Condition fields ignore the input and
    /// re-evaluate instead.
    pub fn set(&self, new_value: impl Into<Value>) {
        if self.is_bool() {
            self.refresh();
            return;
        }
        let incoming = new_value.into();
        let mut cell = self.cell.borrow_mut();
        let kind = cell.value.kind();
        cell.value = incoming.coerce_to(kind);
    }

    /// Fill a text field with `size` copies of the first character of
    /// `pattern`. Non-text fields fall back to [`Field::set`].
    pub fn fill(&self, pattern: impl Into<Value>) {
        if self.is_bool() {
            self.refresh();
            return;
        }
        let pattern = pattern.into();
        if self.kind() != ValueKind::Text {
            self.set(pattern);
            return;
        }
        let Some(ch) = pattern.to_string().chars().next() else {
            tracing::warn!("fill pattern is empty, keeping previous value");
            return;
        };
        let mut cell = self.cell.borrow_mut();
        cell.value = Value::Text(std::iter::repeat(ch).take(cell.size).collect());
    }

    pub fn add(&self, rhs: impl Into<Value>) -> RecordResult<()> {
        self.apply(rhs.into(), Value::add)
    }

    pub fn subtract(&self, rhs: impl Into<Value>) -> RecordResult<()> {
        self.apply(rhs.into(), Value::subtract)
    }

    pub fn multiply_by(&self, rhs: impl Into<Value>) -> RecordResult<()> {
        self.apply(rhs.into(), Value::multiply)
    }

    pub fn divide_by(&self, rhs: impl Into<Value>) -> RecordResult<()> {
        self.apply(rhs.into(), Value::divide)
    }

    fn apply(
        &self,
        rhs: Value,
        op: fn(&Value, &Value) -> RecordResult<Value>,
    ) -> RecordResult<()> {
        let current = self.value();
        let result = op(&current, &rhs)?;
        self.cell.borrow_mut().value = result.coerce_to(current.kind());
        Ok(())
    }

    /// Characters `start..start+length` (1-based) of the printed value
    pub fn get_subvalue(&self, start: usize, length: Option<usize>) -> RecordResult<String> {
        let printed = self.printed_for_subvalue()?;
        let chars: Vec<char> = printed.chars().collect();
        let (from, to) = char_range(chars.len(), start, length)?;
        Ok(chars[from..to].iter().collect())
    }

    /// Replace characters `start..start+length` (1-based) of the printed
    /// value with `text`, then parse the result back into the field's type
    pub fn set_subvalue(
        &self,
        start: usize,
        length: Option<usize>,
        text: &str,
    ) -> RecordResult<()> {
        let kind = self.kind();
        let printed = self.printed_for_subvalue()?;
        let chars: Vec<char> = printed.chars().collect();
        let (from, to) = char_range(chars.len(), start, length)?;

        let updated: String = chars[..from]
            .iter()
            .copied()
            .chain(text.chars())
            .chain(chars[to..].iter().copied())
            .collect();
        let value = Value::parse_as(&updated, kind)
            .ok_or_else(|| RecordError::subvalue_parse_error(&updated, kind))?;
        self.cell.borrow_mut().value = value;
        Ok(())
    }

    fn printed_for_subvalue(&self) -> RecordResult<String> {
        match self.value() {
            Value::Boolean(_) => Err(RecordError::subvalue_unsupported(ValueKind::Boolean)),
            value => Ok(value.to_string()),
        }
    }

    /// Printed value repeated `occurs` times; boolean fields print nothing
    pub fn render(&self) -> String {
        let value = self.value();
        if value.kind() == ValueKind::Boolean {
            return String::new();
        }
        let occurs = self.occurs() as usize;
        itertools::repeat_n(value.to_string(), occurs).join(" ")
    }

    /// Exactly `size` characters: text left-justified, numbers right-justified
    /// with leading zeros, booleans blank
    pub fn encode(&self) -> String {
        let value = self.value();
        let size = self.size();
        match value {
            Value::Boolean(_) => " ".repeat(size),
            Value::Integer(_) | Value::Real(_) if self.occurs() == 1 => {
                justify_numeric(&value.to_string(), size)
            }
            _ => justify_text(&self.render(), size),
        }
    }

    pub fn is_numeric(&self) -> bool {
        predicates::is_numeric(&self.value())
    }

    pub fn is_alphabetic(&self) -> bool {
        predicates::is_alphabetic(&self.value())
    }

    pub fn is_alphabetic_upper(&self) -> bool {
        predicates::is_alphabetic_upper(&self.value())
    }

    pub fn is_alphabetic_lower(&self) -> bool {
        predicates::is_alphabetic_lower(&self.value())
    }

    pub fn is_alphanumeric(&self) -> bool {
        predicates::is_alphanumeric(&self.value())
    }
}

/// 0-based `[from, to)` char range for a 1-based start, clamped to `len`
fn char_range(len: usize, start: usize, length: Option<usize>) -> RecordResult<(usize, usize)> {
    if start == 0 {
        return Err(RecordError::SubvalueRange { start });
    }
    let from = (start - 1).min(len);
    let to = match length {
        Some(length) => from.saturating_add(length).min(len),
        None => len,
    };
    Ok((from, to))
}

fn justify_text(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let used = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - used));
    out
}

fn justify_numeric(printed: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let (sign, digits) = match printed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", printed),
    };
    let digits: Vec<char> = digits.chars().collect();
    let room = width - sign.len();
    let mut out = String::with_capacity(width);
    out.push_str(sign);
    if digits.len() >= room {
        // high-order truncation
        out.extend(&digits[digits.len() - room..]);
    } else {
        out.extend(std::iter::repeat('0').take(room - digits.len()));
        out.extend(&digits);
    }
    out
}

impl From<&Field> for Value {
    fn from(field: &Field) -> Self {
        field.value()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell.borrow();
        f.debug_struct("Field")
            .field("value", &cell.value)
            .field("size", &cell.size)
            .field("start_index", &cell.start_index)
            .field("occurs", &cell.occurs)
            .field("is_bool", &cell.condition.is_some())
            .finish()
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl PartialEq<Value> for Field {
    fn eq(&self, other: &Value) -> bool {
        self.value() == *other
    }
}

macro_rules! impl_field_eq {
    ($($ty:ty),*) => {
        $(
            impl PartialEq<$ty> for Field {
                fn eq(&self, other: &$ty) -> bool {
                    self.value() == Value::from(*other)
                }
            }
        )*
    };
}

impl_field_eq!(i32, i64, u32, f64, bool, &str);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurs_rendering() {
        let field = Field::new(5, 2).with_occurs(3);
        assert_eq!(field.to_string(), "5 5 5");
        assert_eq!(Field::new("x", 1).with_occurs(0).occurs(), 1);
    }

    #[test]
    fn test_condition_field() {
        let area_code = Field::new(619, 3);
        let san_diego = Field::condition(&area_code, 1, |owner| *owner == 619);

        assert!(san_diego.is_bool());
        assert_eq!(san_diego.render(), "");
        assert_eq!(san_diego.value(), Value::Boolean(true));

        area_code.set(858);
        assert_eq!(san_diego.value(), Value::Boolean(false));
    }

    #[test]
    fn test_condition_ignores_assignment() {
        let status = Field::new("A", 1);
        let active = Field::condition(&status, 1, |owner| *owner == "A");
        active.set(false);
        assert_eq!(active, true);
        active.fill("N");
        assert_eq!(active, true);
    }

    #[test]
    fn test_failing_condition_keeps_previous_value() {
        let count = Field::new(4, 2);
        let even = Field::try_condition(&count, 1, |owner| match owner.value() {
            Value::Integer(n) if n >= 0 => Ok(n % 2 == 0),
            _ => Err(RecordError::condition_failure("negative count")),
        });
        assert_eq!(even, true);

        count.set(-3);
        assert!(matches!(
            even.try_refresh(),
            Err(RecordError::ConditionEvaluationFailure { .. })
        ));
        even.set("ignored");
        assert_eq!(even, true);
    }

    #[test]
    fn test_condition_with_dropped_owner() {
        let flag = {
            let owner = Field::new(1, 1);
            Field::condition(&owner, 1, |owner| *owner == 1)
        };
        // evaluated once while the owner was alive
        assert_eq!(flag, true);
        assert!(flag.try_refresh().is_err());
        assert_eq!(flag, true);
    }

    #[test]
    fn test_numeric_leniency() {
        let field = Field::new(7, 3);
        field.set("xyz");
        assert_eq!(field, 0);
        field.set(" 42");
        assert_eq!(field, 42);

        let amount = Field::new(1.5, 5);
        amount.set("oops");
        assert_eq!(amount, 0.0);
    }

    #[test]
    fn test_set_keeps_variant() {
        let name = Field::new("", 5);
        name.set(123);
        assert_eq!(name.kind(), ValueKind::Text);
        assert_eq!(name, "123");

        let qty = Field::new(0, 3);
        qty.set(9.75);
        assert_eq!(qty.kind(), ValueKind::Integer);
        assert_eq!(qty, 9);
    }

    #[test]
    fn test_set_from_field_copies_value_only() {
        let source = Field::new("12", 10);
        source.set_start_index(4);
        let target = Field::new(0, 3);
        target.set(&source);
        assert_eq!(target, 12);
        assert_eq!(target.size(), 3);
        assert_eq!(target.start_index(), 0);
    }

    #[test]
    fn test_fill() {
        let field = Field::new("abc", 4);
        field.fill("*-");
        assert_eq!(field, "****");

        field.fill("");
        assert_eq!(field, "****");

        let number = Field::new(1, 3);
        number.fill("9");
        assert_eq!(number, 9);
    }

    #[test]
    fn test_arithmetic() {
        let total = Field::new(10, 4);
        total.add(5).expect("add");
        total.subtract(3).expect("subtract");
        total.multiply_by(2).expect("multiply");
        assert_eq!(total, 24);
        total.divide_by(5).expect("divide");
        assert_eq!(total, 4);

        let price = Field::new(2.5, 5);
        price.multiply_by(&total).expect("multiply by field");
        assert_eq!(price, 10.0);
    }

    #[test]
    fn test_arithmetic_rejects_non_numeric() {
        let name = Field::new("BOB", 3);
        assert!(matches!(name.add(1), Err(RecordError::InvalidOperand { .. })));
        let total = Field::new(1, 3);
        assert!(matches!(total.add("1"), Err(RecordError::InvalidOperand { .. })));
        assert_eq!(total, 1);
    }

    #[test]
    fn test_subvalue_text() {
        let field = Field::new("HELLO WORLD", 11);
        assert_eq!(field.get_subvalue(1, Some(5)).expect("get"), "HELLO");
        assert_eq!(field.get_subvalue(7, None).expect("get"), "WORLD");
        assert_eq!(field.get_subvalue(20, Some(3)).expect("get"), "");

        field.set_subvalue(1, Some(5), "JELLO").expect("set");
        assert_eq!(field, "JELLO WORLD");
        assert!(matches!(
            field.get_subvalue(0, None),
            Err(RecordError::SubvalueRange { start: 0 })
        ));
    }

    #[test]
    fn test_subvalue_numeric() {
        let field = Field::new(12345, 5);
        assert_eq!(field.get_subvalue(2, Some(3)).expect("get"), "234");
        field.set_subvalue(1, Some(1), "9").expect("set");
        assert_eq!(field, 92345);

        assert!(matches!(
            field.set_subvalue(2, Some(1), "x"),
            Err(RecordError::SubvalueParseError { .. })
        ));
        assert_eq!(field, 92345);

        let rate = Field::new(3.5, 4);
        rate.set_subvalue(1, Some(1), "7").expect("set");
        assert_eq!(rate, 7.5);
    }

    #[test]
    fn test_subvalue_unsupported_for_boolean() {
        let owner = Field::new(1, 1);
        let flag = Field::condition(&owner, 1, |_| true);
        assert!(matches!(
            flag.get_subvalue(1, None),
            Err(RecordError::SubvalueUnsupported { .. })
        ));
        assert!(matches!(
            flag.set_subvalue(1, None, "x"),
            Err(RecordError::SubvalueUnsupported { .. })
        ));
    }

    #[test]
    fn test_encode_widths() {
        assert_eq!(Field::new("AB", 4).encode(), "AB  ");
        assert_eq!(Field::new("ABCDEF", 4).encode(), "ABCD");
        assert_eq!(Field::new(42, 5).encode(), "00042");
        assert_eq!(Field::new(-42, 5).encode(), "-0042");
        assert_eq!(Field::new(123456, 4).encode(), "3456");
        assert_eq!(Field::new(3.5, 5).encode(), "003.5");
        assert_eq!(Field::new(7, 5).with_occurs(2).encode(), "7 7  ");
        assert_eq!(Field::new(true, 2).encode(), "  ");
    }

    #[test]
    fn test_equality_ignores_layout() {
        let a = Field::new("X", 1);
        let b = Field::new("X", 9).with_occurs(2);
        assert_eq!(a, b);
        assert_eq!(Field::new(5, 1), Field::new(5.0, 3));
        assert_ne!(Field::new("5", 1), Field::new(5, 1));
    }

    #[test]
    fn test_field_predicates() {
        assert!(Field::new("ABC", 3).is_alphabetic_upper());
        assert!(Field::new("abc", 3).is_alphabetic_lower());
        assert!(Field::new("a1", 2).is_alphanumeric());
        assert!(Field::new(1, 1).is_numeric());
        assert!(!Field::new("1", 1).is_numeric());
        assert!(Field::new("", 3).is_alphabetic());
    }

    #[test]
    fn test_clone_shares_storage() {
        let a = Field::new("one", 3);
        let b = a.clone();
        b.set("two");
        assert_eq!(a, "two");
    }
}
