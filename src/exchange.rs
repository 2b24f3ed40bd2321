//! Deciding how a column is exchanged with the driver: Which C data type it is bound as, and whether
//! it needs a buffer of its own.

use std::{ffi::c_void, mem::size_of};

use odbc_sys::{CDataType, Len, Timestamp};

use crate::{
    IntoOptions,
    conversion::MAX_BIGINT_LENGTH,
    fixed_sized::Pod,
    handles::DataType,
    target::{ExchangeType, RowId},
};

/// Character encoding of the column in the data source, as far as it matters for fetching text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeType {
    /// `CHAR`, `VARCHAR` and `LONGVARCHAR`.
    NarrowText,
    /// `NCHAR`, `NVARCHAR` and `NTEXT` like columns, which are exchanged as UTF-16.
    WideText,
    /// Anything else.
    Other,
}

impl NativeType {
    pub fn from_data_type(data_type: &DataType) -> Self {
        if data_type.is_wide_text() {
            NativeType::WideText
        } else if data_type.is_narrow_text() {
            NativeType::NarrowText
        } else {
            NativeType::Other
        }
    }
}

/// Buffer owned by a binder for columns which can not be fetched into the variable directly.
#[derive(Debug)]
pub enum ScratchBuffer {
    /// `SQL_C_CHAR`. Holds a terminating zero.
    Narrow(Vec<u8>),
    /// `SQL_C_WCHAR`. UTF-16 code units, holds a terminating zero.
    Wide(Vec<u16>),
    /// `SQL_C_TYPE_TIMESTAMP`.
    Timestamp(Box<Timestamp>),
}

impl ScratchBuffer {
    /// Capacity in units of the buffer. Characters for text, `1` for a timestamp.
    pub fn capacity(&self) -> usize {
        match self {
            ScratchBuffer::Narrow(buf) => buf.len(),
            ScratchBuffer::Wide(buf) => buf.len(),
            ScratchBuffer::Timestamp(_) => 1,
        }
    }

    /// Length of the buffer in bytes, as passed to `SQLBindCol`.
    pub fn buffer_length(&self) -> Len {
        let bytes = match self {
            ScratchBuffer::Narrow(buf) => buf.len(),
            ScratchBuffer::Wide(buf) => buf.len() * size_of::<u16>(),
            ScratchBuffer::Timestamp(_) => size_of::<Timestamp>(),
        };
        // Vec and Box can not hold more than isize::MAX bytes.
        bytes as Len
    }

    pub fn mut_value_ptr(&mut self) -> *mut c_void {
        match self {
            ScratchBuffer::Narrow(buf) => buf.as_mut_ptr() as *mut c_void,
            ScratchBuffer::Wide(buf) => buf.as_mut_ptr() as *mut c_void,
            ScratchBuffer::Timestamp(ts) => ts.as_mut() as *mut Timestamp as *mut c_void,
        }
    }
}

/// How a column is exchanged with the driver.
#[derive(Debug)]
pub struct NativeExchange {
    /// C data type passed to `SQLBindCol`.
    pub c_type: CDataType,
    /// `None` if the driver writes directly into the variable.
    pub buffer: Option<ScratchBuffer>,
}

impl NativeExchange {
    fn direct<T: Pod>() -> Self {
        NativeExchange {
            c_type: T::C_DATA_TYPE,
            buffer: None,
        }
    }

    fn narrow(capacity: usize) -> Self {
        NativeExchange {
            c_type: CDataType::Char,
            buffer: Some(ScratchBuffer::Narrow(vec![0; capacity])),
        }
    }

    fn wide(capacity: usize) -> Self {
        NativeExchange {
            c_type: CDataType::WChar,
            buffer: Some(ScratchBuffer::Wide(vec![0; capacity])),
        }
    }

    /// Text is fetched as UTF-16 from wide columns and as narrow text otherwise. The declared
    /// column size is only trusted if it is plausible.
    fn text(native_type: NativeType, column_size: usize, options: &IntoOptions) -> Self {
        let capacity = options.text_capacity(column_size);
        match native_type {
            NativeType::WideText => Self::wide(capacity),
            NativeType::NarrowText | NativeType::Other => Self::narrow(capacity),
        }
    }

    /// Selects the exchange for a variable of type `exchange_type`, fetched from a column of type
    /// `native_type` with a declared `column_size`. `None` if the variable type can not be fetched
    /// into.
    pub fn select(
        exchange_type: ExchangeType,
        native_type: NativeType,
        column_size: usize,
        options: &IntoOptions,
    ) -> Option<Self> {
        let exchange = match exchange_type {
            // One character plus terminating zero
            ExchangeType::Char => Self::narrow(2),
            ExchangeType::WChar => Self::wide(2),
            ExchangeType::String
            | ExchangeType::WString
            | ExchangeType::LongString
            | ExchangeType::XmlType => Self::text(native_type, column_size, options),
            ExchangeType::Int8 => Self::direct::<i8>(),
            ExchangeType::UInt8 => Self::direct::<u8>(),
            ExchangeType::Int16 => Self::direct::<i16>(),
            ExchangeType::UInt16 => Self::direct::<u16>(),
            ExchangeType::Int32 => Self::direct::<i32>(),
            ExchangeType::UInt32 => Self::direct::<u32>(),
            ExchangeType::Int64 | ExchangeType::UInt64 if options.bigint_as_text => {
                Self::narrow(MAX_BIGINT_LENGTH)
            }
            ExchangeType::Int64 => Self::direct::<i64>(),
            ExchangeType::UInt64 => Self::direct::<u64>(),
            ExchangeType::Double => Self::direct::<f64>(),
            ExchangeType::Timestamp => NativeExchange {
                c_type: CDataType::TypeTimestamp,
                buffer: Some(ScratchBuffer::Timestamp(Box::new(Timestamp {
                    year: 0,
                    month: 0,
                    day: 0,
                    hour: 0,
                    minute: 0,
                    second: 0,
                    fraction: 0,
                }))),
            },
            ExchangeType::RowId => Self::direct::<RowId>(),
            ExchangeType::Blob => return None,
        };
        Some(exchange)
    }
}
