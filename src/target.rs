//! Variables a result column can be fetched into.

use chrono::NaiveDateTime;
use widestring::{WideChar, WideString};

/// A string which is expected to be large (e.g. `TEXT` or `VARCHAR(MAX)`). Fetched like a
/// [`String`], yet without the check whether the value might have been truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LongString {
    pub value: String,
}

/// The text representation of an XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlType {
    pub value: String,
}

/// Identifier of a row, as far as the data source offers one.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub u32);

/// Status of a fetched value reported back to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// A value has been written into the variable.
    Ok,
    /// The value is `NULL`. The variable has not been touched.
    Null,
}

/// The semantic type of an into variable, without the variable. This is what decides how a column
/// is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeType {
    Char,
    WChar,
    String,
    WString,
    LongString,
    XmlType,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    Timestamp,
    RowId,
    Blob,
}

/// Mutable borrow of an application variable a single result column is fetched into.
///
/// The borrow is held for as long as the column is bound, since the driver may write into the
/// variable directly on each fetch.
#[derive(Debug)]
pub enum IntoTarget<'t> {
    /// A single narrow character.
    Char(&'t mut u8),
    /// A single wide character. 32 Bit on most platforms, 16 Bit on windows.
    WChar(&'t mut WideChar),
    String(&'t mut String),
    /// A string of platform wide characters. UTF-32 on most platforms, UTF-16 on windows.
    WString(&'t mut WideString),
    LongString(&'t mut LongString),
    Xml(&'t mut XmlType),
    I8(&'t mut i8),
    U8(&'t mut u8),
    I16(&'t mut i16),
    U16(&'t mut u16),
    I32(&'t mut i32),
    U32(&'t mut u32),
    I64(&'t mut i64),
    U64(&'t mut u64),
    Double(&'t mut f64),
    Timestamp(&'t mut NaiveDateTime),
    RowId(&'t mut RowId),
    /// Binary large objects can not be fetched into a bound column.
    Blob(&'t mut Vec<u8>),
}

impl IntoTarget<'_> {
    pub fn exchange_type(&self) -> ExchangeType {
        match self {
            IntoTarget::Char(_) => ExchangeType::Char,
            IntoTarget::WChar(_) => ExchangeType::WChar,
            IntoTarget::String(_) => ExchangeType::String,
            IntoTarget::WString(_) => ExchangeType::WString,
            IntoTarget::LongString(_) => ExchangeType::LongString,
            IntoTarget::Xml(_) => ExchangeType::XmlType,
            IntoTarget::I8(_) => ExchangeType::Int8,
            IntoTarget::U8(_) => ExchangeType::UInt8,
            IntoTarget::I16(_) => ExchangeType::Int16,
            IntoTarget::U16(_) => ExchangeType::UInt16,
            IntoTarget::I32(_) => ExchangeType::Int32,
            IntoTarget::U32(_) => ExchangeType::UInt32,
            IntoTarget::I64(_) => ExchangeType::Int64,
            IntoTarget::U64(_) => ExchangeType::UInt64,
            IntoTarget::Double(_) => ExchangeType::Double,
            IntoTarget::Timestamp(_) => ExchangeType::Timestamp,
            IntoTarget::RowId(_) => ExchangeType::RowId,
            IntoTarget::Blob(_) => ExchangeType::Blob,
        }
    }
}

macro_rules! impl_from_target {
    ($t:ty, $variant:ident) => {
        impl<'t> From<&'t mut $t> for IntoTarget<'t> {
            fn from(value: &'t mut $t) -> Self {
                IntoTarget::$variant(value)
            }
        }
    };
}

// `u8` is deliberately missing, since it could either be a narrow character or a small integer.
impl_from_target!(String, String);
impl_from_target!(WideString, WString);
impl_from_target!(LongString, LongString);
impl_from_target!(XmlType, Xml);
impl_from_target!(i8, I8);
impl_from_target!(i16, I16);
impl_from_target!(u16, U16);
impl_from_target!(i32, I32);
impl_from_target!(i64, I64);
impl_from_target!(u64, U64);
impl_from_target!(f64, Double);
impl_from_target!(NaiveDateTime, Timestamp);
impl_from_target!(RowId, RowId);
impl_from_target!(Vec<u8>, Blob);
