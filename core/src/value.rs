//! Runtime SQL values, declared field types and normalized key parts.

use core::fmt;

use smallvec::SmallVec;

use crate::error::{RelqError, Result};

//------------------------------------------------------------------------------
// SqlValue
//------------------------------------------------------------------------------

/// A value bound as a parameter or read back from a row.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SqlValue {
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// Enum-like values that bind as their canonical string form.
pub trait SqlEnum {
    /// The canonical name stored in the database.
    fn as_sql_str(&self) -> &'static str;
}

impl SqlValue {
    /// Creates a text value from an enum-like value.
    pub fn enumeration<E: SqlEnum + ?Sized>(value: &E) -> Self {
        SqlValue::Text(value.as_sql_str().to_owned())
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// The value as it is sent to the database: booleans become `1`/`0`.
    pub fn bound(self) -> Self {
        match self {
            SqlValue::Bool(b) => SqlValue::Int32(i32::from(b)),
            other => other,
        }
    }

    /// Integer view of the value, accepting every integer width, booleans and
    /// floats with no fractional part.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            SqlValue::Bool(b) => Some(i128::from(b)),
            SqlValue::Int32(v) => Some(i128::from(v)),
            SqlValue::Int64(v) => Some(i128::from(v)),
            SqlValue::UInt64(v) => Some(i128::from(v)),
            SqlValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e38 => {
                Some(v as i128)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of one member of a `FIND_IN_SET` list. Nulls and blobs have none.
    pub fn list_item(&self) -> Option<String> {
        match self {
            SqlValue::Null | SqlValue::Bytes(_) => None,
            SqlValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_owned()),
            SqlValue::Int32(v) => Some(v.to_string()),
            SqlValue::Int64(v) => Some(v.to_string()),
            SqlValue::UInt64(v) => Some(v.to_string()),
            SqlValue::Float(v) => Some(v.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
        }
    }

    /// Converts the value to the declared type of a field.
    ///
    /// Numeric widths convert into each other when the value fits, numbers
    /// and text parse/format, booleans map to `0`/`1`. Null stays null.
    pub fn coerce(&self, ty: FieldType) -> Result<SqlValue> {
        let fail = || {
            RelqError::Schema(format!("cannot represent {self} as {ty:?}"))
        };
        let value = match (self, ty) {
            (SqlValue::Null, _) => SqlValue::Null,
            (SqlValue::Bool(b), FieldType::Bool) => SqlValue::Bool(*b),
            (SqlValue::Text(s), FieldType::Bool) => match s.trim() {
                "1" | "true" | "TRUE" | "True" => SqlValue::Bool(true),
                "0" | "false" | "FALSE" | "False" => SqlValue::Bool(false),
                _ => return Err(fail()),
            },
            (_, FieldType::Bool) => match self.as_integer() {
                Some(0) => SqlValue::Bool(false),
                Some(1) => SqlValue::Bool(true),
                _ => return Err(fail()),
            },
            (SqlValue::Float(v), FieldType::Float) => SqlValue::Float(*v),
            (SqlValue::Text(s), FieldType::Float) => {
                SqlValue::Float(s.trim().parse().map_err(|_| fail())?)
            }
            (_, FieldType::Float) => match self {
                SqlValue::Int32(v) => SqlValue::Float(f64::from(*v)),
                SqlValue::Int64(v) => SqlValue::Float(*v as f64),
                SqlValue::UInt64(v) => SqlValue::Float(*v as f64),
                SqlValue::Bool(b) => SqlValue::Float(if *b { 1.0 } else { 0.0 }),
                _ => return Err(fail()),
            },
            (SqlValue::Text(s), FieldType::Text) => SqlValue::Text(s.clone()),
            (SqlValue::Bytes(b), FieldType::Text) => {
                SqlValue::Text(String::from_utf8(b.clone()).map_err(|_| fail())?)
            }
            (_, FieldType::Text) => SqlValue::Text(self.list_item().ok_or_else(fail)?),
            (SqlValue::Bytes(b), FieldType::Bytes) => SqlValue::Bytes(b.clone()),
            (SqlValue::Text(s), FieldType::Bytes) => SqlValue::Bytes(s.as_bytes().to_vec()),
            (_, FieldType::Bytes) => return Err(fail()),
            (_, FieldType::Int32 | FieldType::Int64 | FieldType::UInt64) => {
                let wide = match self {
                    SqlValue::Text(s) => s.trim().parse::<i128>().map_err(|_| fail())?,
                    _ => self.as_integer().ok_or_else(fail)?,
                };
                match ty {
                    FieldType::Int32 => SqlValue::Int32(i32::try_from(wide).map_err(|_| fail())?),
                    FieldType::Int64 => SqlValue::Int64(i64::try_from(wide).map_err(|_| fail())?),
                    _ => SqlValue::UInt64(u64::try_from(wide).map_err(|_| fail())?),
                }
            }
        };
        Ok(value)
    }

    /// Normalized, hashable form used to match keys across representations.
    pub fn key_part(&self) -> KeyPart {
        if let Some(v) = self.as_integer() {
            return KeyPart::Int(v);
        }
        match self {
            SqlValue::Null => KeyPart::Null,
            SqlValue::Float(v) => KeyPart::Float(v.to_bits()),
            SqlValue::Text(s) => KeyPart::Text(s.clone()),
            SqlValue::Bytes(b) => KeyPart::Bytes(b.clone()),
            // every other variant has an integer view
            _ => KeyPart::Null,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Int32(v) => write!(f, "{v}"),
            SqlValue::Int64(v) => write!(f, "{v}"),
            SqlValue::UInt64(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! impl_from_sql_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_sql_value!(
    bool => Bool,
    i8 => Int32,
    i16 => Int32,
    i32 => Int32,
    u8 => Int32,
    u16 => Int32,
    u32 => Int64,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    &String => Text,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
);

impl From<usize> for SqlValue {
    fn from(value: usize) -> Self {
        SqlValue::UInt64(value as u64)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

//------------------------------------------------------------------------------
// FromSqlValue
//------------------------------------------------------------------------------

/// Reads a Rust value back out of a [`SqlValue`], used by row materializers.
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: &SqlValue) -> Result<Self>;
}

macro_rules! impl_from_sql_value_via_coerce {
    ($($ty:ty => $field:ident / $variant:ident),* $(,)?) => {
        $(
            impl FromSqlValue for $ty {
                fn from_sql_value(value: &SqlValue) -> Result<Self> {
                    match value.coerce(FieldType::$field) {
                        Ok(SqlValue::$variant(v)) => Ok(v),
                        Ok(other) => Err(RelqError::Mapping(format!(
                            "expected {}, found {other}",
                            stringify!($ty)
                        ))),
                        Err(err) => Err(RelqError::Mapping(err.to_string())),
                    }
                }
            }
        )*
    };
}

impl_from_sql_value_via_coerce!(
    bool => Bool / Bool,
    i32 => Int32 / Int32,
    i64 => Int64 / Int64,
    u64 => UInt64 / UInt64,
    f64 => Float / Float,
    String => Text / Text,
    Vec<u8> => Bytes / Bytes,
);

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_sql_value(value).map(Some)
        }
    }
}

//------------------------------------------------------------------------------
// FieldType
//------------------------------------------------------------------------------

/// Declared storage type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    Bool,
    Int32,
    Int64,
    UInt64,
    Float,
    Text,
    Bytes,
}

//------------------------------------------------------------------------------
// Keys
//------------------------------------------------------------------------------

/// One normalized key component.
///
/// All integer widths (and integral floats) collapse into `Int`, so an `i32`
/// and an `i64` holding the same number compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Null,
    Int(i128),
    Float(u64),
    Text(String),
    Bytes(Vec<u8>),
}

/// Key of one row or item across all join fields.
pub type KeyTuple = SmallVec<[KeyPart; 2]>;
