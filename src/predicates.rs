//! Class tests over values (NUMERIC, ALPHABETIC and friends)
//!
//! Every test is total: a value of the wrong variant is simply not in the
//! class. Empty and all-blank text satisfies every alphabetic class.

use crate::value::Value;

/// True for integer and real values
pub fn is_numeric(value: &Value) -> bool {
    value.is_numeric_kind()
}

/// Letters and whitespace only
pub fn is_alphabetic(value: &Value) -> bool {
    text_matches(value, |c| c.is_ascii_alphabetic())
}

/// Upper-case letters and whitespace only
pub fn is_alphabetic_upper(value: &Value) -> bool {
    text_matches(value, |c| c.is_ascii_uppercase())
}

/// Lower-case letters and whitespace only
pub fn is_alphabetic_lower(value: &Value) -> bool {
    text_matches(value, |c| c.is_ascii_lowercase())
}

/// Letters, digits and whitespace only
pub fn is_alphanumeric(value: &Value) -> bool {
    text_matches(value, |c| c.is_ascii_alphanumeric())
}

fn text_matches(value: &Value, allowed: impl Fn(char) -> bool) -> bool {
    match value {
        Value::Text(s) => s.chars().all(|c| c.is_whitespace() || allowed(c)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_only_for_numbers() {
        assert!(is_numeric(&Value::from(12)));
        assert!(is_numeric(&Value::from(1.5)));
        assert!(!is_numeric(&Value::from("123")));
        assert!(!is_numeric(&Value::from(true)));
    }

    #[test]
    fn test_alphabetic_classes() {
        assert!(is_alphabetic(&Value::from("John Smith")));
        assert!(!is_alphabetic(&Value::from("R2D2")));
        assert!(is_alphabetic_upper(&Value::from("NEW YORK")));
        assert!(!is_alphabetic_upper(&Value::from("New York")));
        assert!(is_alphabetic_lower(&Value::from("new york")));
        assert!(!is_alphabetic_lower(&Value::from("new York")));
    }

    #[test]
    fn test_alphanumeric() {
        assert!(is_alphanumeric(&Value::from("R2D2 unit")));
        assert!(!is_alphanumeric(&Value::from("R2-D2")));
    }

    #[test]
    fn test_blank_text_is_alphabetic() {
        for class in [
            is_alphabetic,
            is_alphabetic_upper,
            is_alphabetic_lower,
            is_alphanumeric,
        ] {
            assert!(class(&Value::from("")));
            assert!(class(&Value::from("   ")));
        }
    }

    #[test]
    fn test_non_text_is_never_alphabetic() {
        assert!(!is_alphabetic(&Value::from(5)));
        assert!(!is_alphabetic_upper(&Value::from(false)));
        assert!(!is_alphanumeric(&Value::from(2.0)));
    }
}
