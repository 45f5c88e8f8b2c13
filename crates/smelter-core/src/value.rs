//! Dynamic scalar values carried by row cells.
//!
//! Batches arrive at runtime with no compile-time row type, so cells hold a
//! small self-describing enum. Driver crates map each variant onto their
//! native bind types; values are always bound as statement parameters, never
//! interpolated into SQL text.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single cell value inside a [`Row`](crate::Row).
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// UUID value.
    Uuid(Uuid),
    /// Timestamp with UTC offset.
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    /// Returns `true` for [`ScalarValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, for diagnostics and error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Uuid(_) => "uuid",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

/// Trait for types that can be converted to a [`ScalarValue`].
pub trait ToScalar {
    /// Converts the value to a `ScalarValue`.
    fn to_scalar(self) -> ScalarValue;
}

impl ToScalar for ScalarValue {
    fn to_scalar(self) -> ScalarValue {
        self
    }
}

impl ToScalar for bool {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Bool(self)
    }
}

impl ToScalar for i64 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Int(self)
    }
}

impl ToScalar for i32 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Int(i64::from(self))
    }
}

impl ToScalar for i16 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Int(i64::from(self))
    }
}

impl ToScalar for i8 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Int(i64::from(self))
    }
}

impl ToScalar for u32 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Int(i64::from(self))
    }
}

impl ToScalar for u16 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Int(i64::from(self))
    }
}

impl ToScalar for u8 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Int(i64::from(self))
    }
}

impl ToScalar for f64 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Float(self)
    }
}

impl ToScalar for f32 {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Float(f64::from(self))
    }
}

impl ToScalar for String {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Text(self)
    }
}

impl ToScalar for &str {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Text(String::from(self))
    }
}

impl ToScalar for Vec<u8> {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Blob(self)
    }
}

impl ToScalar for &[u8] {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Blob(self.to_vec())
    }
}

impl ToScalar for Uuid {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Uuid(self)
    }
}

impl ToScalar for DateTime<Utc> {
    fn to_scalar(self) -> ScalarValue {
        ScalarValue::Timestamp(self)
    }
}

impl<T: ToScalar> ToScalar for Option<T> {
    fn to_scalar(self) -> ScalarValue {
        match self {
            Some(v) => v.to_scalar(),
            None => ScalarValue::Null,
        }
    }
}
