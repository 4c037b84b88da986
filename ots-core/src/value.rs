//! Typed column values and their wire encoding.
//!
//! This module provides [`Value`], the closed set of value shapes a column
//! can hold, plus lossless conversion to and from the wire representation
//! ([`pb::ColumnValue`]). Strings are always UTF-8 on the wire, binary values
//! are raw byte sequences, and integers are 64-bit signed.
//!
//! The two extremes [`Value::InfMin`] and [`Value::InfMax`] exist only as
//! open-ended range-query bounds. They are rejected as primary-key or
//! attribute values and are never produced by decoding a response.

use std::cmp::Ordering;

use crate::pb;

/// Bounds of the signed 32-bit range used by counter fields (capacity units,
/// limits). Column values use the full 64-bit range.
const INT32_MIN: i64 = i32::MIN as i64;
const INT32_MAX: i64 = i32::MAX as i64;

/// A typed column value.
///
/// # Example
///
/// ```
/// use ots_core::Value;
///
/// let v = Value::Integer(7);
/// let wire = v.to_wire().unwrap();
/// assert_eq!(Value::from_wire(&wire).unwrap(), v);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),
    /// IEEE-754 double.
    Double(f64),
    /// Boolean.
    Boolean(bool),
    /// UTF-8 string.
    String(String),
    /// Raw byte sequence.
    Binary(Vec<u8>),
    /// Sorts below every concrete value; valid only as a range start bound.
    InfMin,
    /// Sorts above every concrete value; valid only as a range end bound.
    InfMax,
}

/// Errors produced by value encoding and decoding.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// The value shape is not allowed in this position (e.g. a range extreme
    /// used as a concrete column value).
    #[error("unsupported value type: {0}")]
    UnsupportedType(String),

    /// The wire value's type tag does not agree with its populated payload.
    #[error("malformed wire value: {0}")]
    MalformedValue(String),

    /// A counter value does not fit the signed 32-bit range.
    #[error("{0} exceeds the range of int32")]
    IntegerOverflow(i64),
}

impl Value {
    /// The wire type tag for this value.
    pub fn column_type(&self) -> pb::ColumnType {
        match self {
            Value::Integer(_) => pb::ColumnType::Integer,
            Value::Double(_) => pb::ColumnType::Double,
            Value::Boolean(_) => pb::ColumnType::Boolean,
            Value::String(_) => pb::ColumnType::String,
            Value::Binary(_) => pb::ColumnType::Binary,
            Value::InfMin => pb::ColumnType::InfMin,
            Value::InfMax => pb::ColumnType::InfMax,
        }
    }

    /// Whether this is one of the two range-bound extremes.
    pub fn is_extreme(&self) -> bool {
        matches!(self, Value::InfMin | Value::InfMax)
    }

    /// Encode a concrete column value for the wire.
    ///
    /// Fails with [`ValueError::UnsupportedType`] for the range extremes,
    /// which are only valid as primary-key bounds in range queries; use
    /// [`Value::to_wire_bound`] there.
    pub fn to_wire(&self) -> Result<pb::ColumnValue, ValueError> {
        if self.is_extreme() {
            return Err(ValueError::UnsupportedType(format!(
                "{:?} is only valid as a range bound",
                self.column_type(),
            )));
        }
        Ok(self.to_wire_bound())
    }

    /// Encode a value in range-bound position, where the extremes are legal.
    pub fn to_wire_bound(&self) -> pb::ColumnValue {
        let mut wire = pb::ColumnValue {
            r#type: self.column_type() as i32,
            v_int: None,
            v_string: None,
            v_bool: None,
            v_double: None,
            v_binary: None,
        };
        match self {
            Value::Integer(v) => wire.v_int = Some(*v),
            Value::Double(v) => wire.v_double = Some(*v),
            Value::Boolean(v) => wire.v_bool = Some(*v),
            Value::String(v) => wire.v_string = Some(v.clone()),
            Value::Binary(v) => wire.v_binary = Some(v.clone()),
            Value::InfMin | Value::InfMax => {}
        }
        wire
    }

    /// Decode a wire value.
    ///
    /// Rejects with [`ValueError::MalformedValue`] when the type tag is
    /// unknown, is one of the range extremes (the service never returns
    /// them), or does not agree with the populated payload field.
    pub fn from_wire(wire: &pb::ColumnValue) -> Result<Value, ValueError> {
        let tag = pb::ColumnType::try_from(wire.r#type)
            .map_err(|_| ValueError::MalformedValue(format!("unknown type tag {}", wire.r#type)))?;

        let populated = [
            wire.v_int.is_some(),
            wire.v_string.is_some(),
            wire.v_bool.is_some(),
            wire.v_double.is_some(),
            wire.v_binary.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();
        if populated > 1 {
            return Err(ValueError::MalformedValue(format!(
                "{populated} payload fields populated for tag {tag:?}",
            )));
        }

        let mismatch = || ValueError::MalformedValue(format!("payload does not match tag {tag:?}"));
        match tag {
            pb::ColumnType::Integer => wire.v_int.map(Value::Integer).ok_or_else(mismatch),
            pb::ColumnType::Double => wire.v_double.map(Value::Double).ok_or_else(mismatch),
            pb::ColumnType::Boolean => wire.v_bool.map(Value::Boolean).ok_or_else(mismatch),
            pb::ColumnType::String => wire.v_string.clone().map(Value::String).ok_or_else(mismatch),
            pb::ColumnType::Binary => wire.v_binary.clone().map(Value::Binary).ok_or_else(mismatch),
            pb::ColumnType::InfMin | pb::ColumnType::InfMax => Err(ValueError::MalformedValue(
                format!("{tag:?} is not a concrete column value"),
            )),
        }
    }

    /// Compare two values under primary-key ordering.
    ///
    /// [`Value::InfMin`] sorts below and [`Value::InfMax`] above every
    /// value. Concrete values compare within their own type (doubles by
    /// total order); values of different concrete types are not comparable
    /// and yield `None`.
    pub fn cmp_key_order(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (InfMin, InfMin) | (InfMax, InfMax) => Some(Ordering::Equal),
            (InfMin, _) | (_, InfMax) => Some(Ordering::Less),
            (InfMax, _) | (_, InfMin) => Some(Ordering::Greater),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Double(a), Double(b)) => Some(a.total_cmp(b)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Binary(a), Binary(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Narrow a counter value to `i32`, failing with
/// [`ValueError::IntegerOverflow`] when out of range.
pub fn checked_i32(value: i64) -> Result<i32, ValueError> {
    if !(INT32_MIN..=INT32_MAX).contains(&value) {
        return Err(ValueError::IntegerOverflow(value));
    }
    Ok(value as i32)
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_concrete_variants() {
        let values = vec![
            Value::Integer(-42),
            Value::Double(3.25),
            Value::Boolean(true),
            Value::String("row".to_string()),
            Value::Binary(vec![0, 1, 0xff]),
        ];
        for v in values {
            let wire = v.to_wire().unwrap();
            assert_eq!(Value::from_wire(&wire).unwrap(), v);
        }
    }

    #[test]
    fn test_extremes_rejected_as_concrete_values() {
        assert!(matches!(
            Value::InfMin.to_wire(),
            Err(ValueError::UnsupportedType(_))
        ));
        assert!(matches!(
            Value::InfMax.to_wire(),
            Err(ValueError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_extremes_encode_as_bounds() {
        let wire = Value::InfMin.to_wire_bound();
        assert_eq!(wire.r#type, pb::ColumnType::InfMin as i32);
        assert!(wire.v_int.is_none());
        assert!(wire.v_string.is_none());
    }

    #[test]
    fn test_decode_rejects_mismatched_payload() {
        let wire = pb::ColumnValue {
            r#type: pb::ColumnType::Integer as i32,
            v_int: None,
            v_string: Some("not an int".to_string()),
            v_bool: None,
            v_double: None,
            v_binary: None,
        };
        assert!(matches!(
            Value::from_wire(&wire),
            Err(ValueError::MalformedValue(_))
        ));
    }

    #[test]
    fn test_decode_rejects_multiple_payloads() {
        let wire = pb::ColumnValue {
            r#type: pb::ColumnType::Integer as i32,
            v_int: Some(1),
            v_string: None,
            v_bool: Some(true),
            v_double: None,
            v_binary: None,
        };
        assert!(matches!(
            Value::from_wire(&wire),
            Err(ValueError::MalformedValue(_))
        ));
    }

    #[test]
    fn test_decode_rejects_extreme_tags() {
        let wire = pb::ColumnValue {
            r#type: pb::ColumnType::InfMax as i32,
            v_int: None,
            v_string: None,
            v_bool: None,
            v_double: None,
            v_binary: None,
        };
        assert!(matches!(
            Value::from_wire(&wire),
            Err(ValueError::MalformedValue(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        let wire = pb::ColumnValue {
            r#type: 99,
            v_int: Some(1),
            v_string: None,
            v_bool: None,
            v_double: None,
            v_binary: None,
        };
        assert!(matches!(
            Value::from_wire(&wire),
            Err(ValueError::MalformedValue(_))
        ));
    }

    #[test]
    fn test_key_order_extremes() {
        let concrete = Value::Integer(0);
        assert_eq!(
            Value::InfMin.cmp_key_order(&concrete),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::InfMax.cmp_key_order(&concrete),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::InfMin.cmp_key_order(&Value::InfMax),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::InfMin.cmp_key_order(&Value::InfMin),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_key_order_same_type() {
        assert_eq!(
            Value::Integer(1).cmp_key_order(&Value::Integer(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::String("b".into()).cmp_key_order(&Value::String("a".into())),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Binary(vec![1]).cmp_key_order(&Value::Binary(vec![1])),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_key_order_mixed_types_incomparable() {
        assert_eq!(
            Value::Integer(1).cmp_key_order(&Value::String("1".into())),
            None
        );
    }

    #[test]
    fn test_checked_i32_bounds() {
        assert_eq!(checked_i32(0).unwrap(), 0);
        assert_eq!(checked_i32(i32::MAX as i64).unwrap(), i32::MAX);
        assert_eq!(checked_i32(i32::MIN as i64).unwrap(), i32::MIN);
        assert!(matches!(
            checked_i32(i32::MAX as i64 + 1),
            Err(ValueError::IntegerOverflow(_))
        ));
        assert!(matches!(
            checked_i32(i32::MIN as i64 - 1),
            Err(ValueError::IntegerOverflow(_))
        ));
    }
}
