//! An in memory stand in for an ODBC driver, so column binding can be tested without a data source.
//! It honors the `SQLBindCol` contract: Pointers passed to `bind_col` are written through on every
//! `fetch` until `unbind_cols` is called.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::{mem::size_of, ptr};

use odbc_into::{
    Error, Indicator, IntoBinder, IntoOptions, IntoTarget,
    handles::{
        ColumnDescription, DataType, DiagnosticResult, Diagnostics, Nullability, SqlChar,
        SqlResult, State, Statement,
    },
    sys::{CDataType, Len, NO_TOTAL, NULL_DATA, Pointer, Timestamp},
};

/// Initializes logging, so `RUST_LOG=debug cargo test` shows what the binders do.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A value of a single field in the fake result set.
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Timestamp(Timestamp),
}

pub struct FakeColumn {
    name: String,
    data_type: DataType,
    values: Vec<Value>,
    /// Report `SQL_NO_TOTAL` instead of the length of text values.
    no_total: bool,
    /// `SQLBindCol` fails with `HY004`, if the column is bound as this type.
    rejected_c_type: Option<CDataType>,
}

impl FakeColumn {
    pub fn new(name: &str, data_type: DataType, values: Vec<Value>) -> Self {
        FakeColumn {
            name: name.to_owned(),
            data_type,
            values,
            no_total: false,
            rejected_c_type: None,
        }
    }

    pub fn reporting_no_total(mut self) -> Self {
        self.no_total = true;
        self
    }

    pub fn rejecting(mut self, c_type: CDataType) -> Self {
        self.rejected_c_type = Some(c_type);
        self
    }
}

struct Binding {
    c_type: CDataType,
    value: Pointer,
    length: Len,
    indicator: *mut Len,
}

struct Diagnostic {
    state: State,
    native_error: i32,
    message: String,
}

pub struct FakeStatement {
    columns: Vec<FakeColumn>,
    bindings: Vec<Option<Binding>>,
    next_row: usize,
    diagnostic: Option<Diagnostic>,
    /// Number of calls to `unbind_cols`.
    pub unbind_calls: usize,
}

impl FakeStatement {
    pub fn new(columns: Vec<FakeColumn>) -> Self {
        let bindings = columns.iter().map(|_| None).collect();
        FakeStatement {
            columns,
            bindings,
            next_row: 0,
            diagnostic: None,
            unbind_calls: 0,
        }
    }

    /// A result set with a single column.
    pub fn single(data_type: DataType, values: Vec<Value>) -> Self {
        Self::new(vec![FakeColumn::new("a", data_type, values)])
    }

    /// `true` if the column at the one based `column_number` is bound.
    pub fn is_bound(&self, column_number: usize) -> bool {
        self.bindings[column_number - 1].is_some()
    }

    fn fail(&mut self, function: &'static str, state: &[u8; 5], message: &str) -> SqlResult<()> {
        self.diagnostic = Some(Diagnostic {
            state: State(*state),
            native_error: 42,
            message: message.to_owned(),
        });
        SqlResult::Error { function }
    }

    fn num_rows(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }
}

impl Diagnostics for FakeStatement {
    fn diagnostic_record(
        &self,
        rec_number: i16,
        message_text: &mut [SqlChar],
    ) -> Option<DiagnosticResult> {
        let diagnostic = self.diagnostic.as_ref().filter(|_| rec_number == 1)?;
        let message = diagnostic.message.as_bytes();
        for (dest, &byte) in message_text.iter_mut().zip(message) {
            *dest = byte as SqlChar;
        }
        Some(DiagnosticResult {
            state: diagnostic.state,
            native_error: diagnostic.native_error,
            text_length: message.len() as i16,
        })
    }
}

impl Statement for FakeStatement {
    fn describe_col(
        &self,
        column_number: u16,
        column_description: &mut ColumnDescription,
    ) -> SqlResult<()> {
        let Some(column) = self.columns.get(usize::from(column_number).wrapping_sub(1)) else {
            // Reported without diagnostic record
            return SqlResult::Error {
                function: "SQLDescribeCol",
            };
        };
        column_description.name = column.name.bytes().map(|b| b as SqlChar).collect();
        column_description.data_type = column.data_type;
        column_description.nullability = Nullability::Nullable;
        SqlResult::Success(())
    }

    unsafe fn bind_col(
        &mut self,
        column_number: u16,
        target_type: CDataType,
        target_value: Pointer,
        target_length: Len,
        indicator: *mut Len,
    ) -> SqlResult<()> {
        self.diagnostic = None;
        let index = usize::from(column_number) - 1;
        if self.columns[index].rejected_c_type == Some(target_type) {
            return self.fail("SQLBindCol", b"HY004", "[Fake][ODBC]Invalid SQL data type <-25>");
        }
        self.bindings[index] = Some(Binding {
            c_type: target_type,
            value: target_value,
            length: target_length,
            indicator,
        });
        SqlResult::Success(())
    }

    fn fetch(&mut self) -> SqlResult<()> {
        self.diagnostic = None;
        if self.next_row >= self.num_rows() {
            return SqlResult::NoData;
        }
        let row = self.next_row;
        self.next_row += 1;

        let mut truncated = false;
        for (column, binding) in self.columns.iter().zip(&self.bindings) {
            if let Some(binding) = binding {
                truncated |= unsafe { write_value(column, &column.values[row], binding) };
            }
        }

        if truncated {
            self.diagnostic = Some(Diagnostic {
                state: State::STRING_DATA_RIGHT_TRUNCATION,
                native_error: 0,
                message: "[Fake][ODBC]String data, right truncation".to_owned(),
            });
            SqlResult::SuccessWithInfo(())
        } else {
            SqlResult::Success(())
        }
    }

    fn unbind_cols(&mut self) -> SqlResult<()> {
        self.unbind_calls += 1;
        for binding in &mut self.bindings {
            *binding = None;
        }
        SqlResult::Success(())
    }
}

/// Writes `value` converted to the bound C type. `true` if the value has been truncated.
unsafe fn write_value(column: &FakeColumn, value: &Value, binding: &Binding) -> bool {
    unsafe {
        match value {
            Value::Null => {
                *binding.indicator = NULL_DATA;
                false
            }
            Value::Text(text) => write_text(column, text, binding),
            Value::Int(i) => match binding.c_type {
                CDataType::Char | CDataType::WChar => write_text(column, &i.to_string(), binding),
                _ => write_number(*i as f64, *i, *i as u64, binding),
            },
            Value::UInt(u) => match binding.c_type {
                CDataType::Char | CDataType::WChar => write_text(column, &u.to_string(), binding),
                _ => write_number(*u as f64, *u as i64, *u, binding),
            },
            Value::Float(f) => write_number(*f, *f as i64, *f as u64, binding),
            Value::Timestamp(ts) => {
                assert_eq!(CDataType::TypeTimestamp, binding.c_type);
                write_fixed(
                    Timestamp {
                        year: ts.year,
                        month: ts.month,
                        day: ts.day,
                        hour: ts.hour,
                        minute: ts.minute,
                        second: ts.second,
                        fraction: ts.fraction,
                    },
                    binding,
                );
                false
            }
        }
    }
}

unsafe fn write_text(column: &FakeColumn, text: &str, binding: &Binding) -> bool {
    let length = binding.length as usize;
    let (total_bytes, written_bytes) = unsafe {
        match binding.c_type {
            CDataType::Char => {
                let bytes = text.as_bytes();
                let fits = bytes.len().min(length - 1);
                let dest = binding.value as *mut u8;
                ptr::copy_nonoverlapping(bytes.as_ptr(), dest, fits);
                *dest.add(fits) = 0;
                (bytes.len(), fits)
            }
            CDataType::WChar => {
                let units: Vec<u16> = text.encode_utf16().collect();
                let fits = units.len().min(length / 2 - 1);
                let dest = binding.value as *mut u16;
                ptr::copy_nonoverlapping(units.as_ptr(), dest, fits);
                *dest.add(fits) = 0;
                (units.len() * 2, fits * 2)
            }
            other => panic!("Fake driver can not convert text to {other:?}"),
        }
    };
    unsafe {
        *binding.indicator = if column.no_total {
            NO_TOTAL
        } else {
            total_bytes as Len
        };
    }
    written_bytes < total_bytes
}

unsafe fn write_number(f: f64, i: i64, u: u64, binding: &Binding) -> bool {
    unsafe {
        match binding.c_type {
            CDataType::STinyInt => write_fixed(i as i8, binding),
            CDataType::UTinyInt => write_fixed(u as u8, binding),
            CDataType::SShort => write_fixed(i as i16, binding),
            CDataType::UShort => write_fixed(u as u16, binding),
            CDataType::SLong => write_fixed(i as i32, binding),
            CDataType::ULong => write_fixed(u as u32, binding),
            CDataType::SBigInt => write_fixed(i, binding),
            CDataType::UBigInt => write_fixed(u, binding),
            CDataType::Double => write_fixed(f, binding),
            other => panic!("Fake driver can not convert numbers to {other:?}"),
        }
    }
    false
}

unsafe fn write_fixed<T>(value: T, binding: &Binding) {
    assert_eq!(size_of::<T>() as Len, binding.length);
    unsafe {
        (binding.value as *mut T).write(value);
        *binding.indicator = size_of::<T>() as Len;
    }
}

/// `true` if the fetch returned a row.
pub fn got_data(result: SqlResult<()>) -> bool {
    match result {
        SqlResult::Success(()) | SqlResult::SuccessWithInfo(()) => true,
        SqlResult::NoData => false,
        SqlResult::Error { function } => panic!("{function} failed"),
    }
}

/// Binds `target` to the first column of `statement`, fetches one row into it and unbinds again.
/// Returns the indicator of the fetched value.
pub fn fetch_one<'t>(
    statement: &mut FakeStatement,
    target: impl Into<IntoTarget<'t>>,
    options: IntoOptions,
) -> Result<Indicator, Error> {
    let mut binder = IntoBinder::new(target, options);
    let mut position = 1;
    unsafe { binder.bind(statement, &mut position)? };
    let has_row = statement.fetch().into_result_bool(&*statement)?;
    let mut indicator = Indicator::Ok;
    let result = binder.post_fetch(has_row, true, Some(&mut indicator));
    succeed(statement.unbind_cols());
    binder.clean_up();
    result.map(|()| indicator)
}

fn succeed(result: SqlResult<()>) {
    if let SqlResult::Error { function } = result {
        panic!("{function} failed")
    }
}
