#![forbid(unsafe_code)]

//! Dynamically typed field values.
//!
//! Every field of a [`State`](crate::State) holds a [`Value`]. Change
//! suppression uses [`Value::same_value`]: identity for shared values,
//! NaN-aware and sign-aware for numbers, and never deep equality.

use std::fmt;
use std::rc::Rc;

use kview_core::{format_number, parse_number};

use crate::model::{Model, ModelRef};

/// A field value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Shared sequence. Two lists are the same only if they share storage.
    List(Rc<Vec<Value>>),
    /// Reference to another state object.
    Object(ModelRef),
}

impl Value {
    /// Build a list value from anything convertible.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::List(Rc::new(items.into_iter().map(Into::into).collect()))
    }

    /// List of selection indices.
    #[must_use]
    pub fn indices(indices: &[usize]) -> Self {
        Self::list(indices.iter().copied())
    }

    /// Wrap a model as an object value.
    pub fn object<T: Model>(model: &Rc<T>) -> Self {
        Self::Object(ModelRef::new(Rc::clone(model)))
    }

    /// Change-suppression equality.
    ///
    /// NaN equals NaN, `+0` differs from `-0`, values of different kinds
    /// always differ, lists and objects compare by identity.
    #[must_use]
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => {
                if a.is_nan() || b.is_nan() {
                    a.is_nan() && b.is_nan()
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Loose truthiness used by visible/enabled bindings.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::List(_) | Self::Object(_) => true,
        }
    }

    /// Numeric coercion: Null is 0, booleans are 0/1, text is parsed,
    /// a one-element list coerces its element, anything else is NaN.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::Text(s) => parse_number(s),
            Self::List(items) => match items.as_slice() {
                [] => 0.0,
                [one] => one.as_number(),
                _ => f64::NAN,
            },
            Self::Object(_) => f64::NAN,
        }
    }

    /// Display string; Null renders as empty text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ModelRef> {
        match self {
            Self::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Non-negative integral numbers of a list, in order. Anything else is
    /// skipped.
    #[must_use]
    pub fn to_indices(&self) -> Vec<usize> {
        self.as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(|v| match v {
                Self::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
                    Some(*n as usize)
                }
                _ => None,
            })
            .collect()
    }

    /// Short kind name for logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }
}

/// Same as [`Value::same_value`]; lets tests use `assert_eq!`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Object(_) => f.write_str("[object]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::Text(s) => write!(f, "Text({s:?})"),
            Self::List(items) => f.debug_list().entries(items.iter()).finish(),
            Self::Object(m) => write!(f, "Object({m:?})"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(Rc::new(items))
    }
}

impl From<ModelRef> for Value {
    fn from(m: ModelRef) -> Self {
        Self::Object(m)
    }
}

impl<T: Model> From<Rc<T>> for Value {
    fn from(m: Rc<T>) -> Self {
        Self::Object(ModelRef::new(m))
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nan_is_same_as_nan() {
        assert!(Value::Number(f64::NAN).same_value(&Value::Number(f64::NAN)));
    }

    #[test]
    fn signed_zeros_differ() {
        assert!(!Value::Number(0.0).same_value(&Value::Number(-0.0)));
    }

    #[test]
    fn kinds_never_coincide() {
        assert!(!Value::Number(0.0).same_value(&Value::from("0")));
        assert!(!Value::Null.same_value(&Value::from(false)));
    }

    #[test]
    fn lists_compare_by_identity() {
        let a = Value::list([1, 2]);
        let b = Value::list([1, 2]);
        assert!(!a.same_value(&b));
        assert!(a.same_value(&a.clone()));
    }

    #[test]
    fn display_strings() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::from(3).to_text(), "3");
        assert_eq!(Value::list(["a", "b"]).to_text(), "a,b");
        assert_eq!(Value::from(true).to_text(), "true");
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::Null.as_number(), 0.0);
        assert_eq!(Value::from(" 7 ").as_number(), 7.0);
        assert_eq!(Value::from("").as_number(), 0.0);
        assert!(Value::from("x").as_number().is_nan());
        assert_eq!(Value::from(true).as_number(), 1.0);
    }

    #[test]
    fn indices_skip_non_integers() {
        let v = Value::list([Value::from(1), Value::from(2.5), Value::from(-1), Value::from(3)]);
        assert_eq!(v.to_indices(), vec![1, 3]);
        assert!(Value::Null.to_indices().is_empty());
    }

    proptest! {
        #[test]
        fn same_value_is_reflexive_for_numbers(n in any::<f64>()) {
            prop_assert!(Value::Number(n).same_value(&Value::Number(n)));
        }

        #[test]
        fn same_value_is_symmetric(a in any::<f64>(), b in any::<f64>()) {
            let (va, vb) = (Value::Number(a), Value::Number(b));
            prop_assert_eq!(va.same_value(&vb), vb.same_value(&va));
        }

        #[test]
        fn text_and_number_never_same(n in any::<f64>()) {
            let text = Value::Text(format_number(n));
            prop_assert!(!Value::Number(n).same_value(&text));
        }
    }
}
