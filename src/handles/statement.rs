use super::{
    as_handle::AsHandle,
    buffer::{clamp_small_int, mut_buf_ptr},
    column_description::{ColumnDescription, Nullability},
    data_type::DataType,
    diagnostics::Diagnostics,
    sql_result::{ExtSqlReturn, SqlResult},
};
use odbc_sys::{
    CDataType, FreeStmtOption, HDbc, HStmt, Handle, HandleType, Len, Pointer, SQLBindCol,
    SQLFetch, SQLFreeStmt, SqlDataType,
};
use std::marker::PhantomData;

#[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
use odbc_sys::SQLDescribeColW as sql_describe_col;

#[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
use odbc_sys::SQLDescribeCol as sql_describe_col;

/// The part of an ODBC statement handle a column binder needs: learning what a column looks like,
/// binding buffers to it and advancing the cursor.
///
/// [`StatementRef`] implements this in terms of the ODBC C API. Anything else implementing it (e.g.
/// an in memory stand in for a driver) must honor the contract of `SQLBindCol`: the driver keeps
/// the pointers passed to [`Self::bind_col`] and writes through them on every call to
/// [`Self::fetch`] until the columns are unbound.
pub trait Statement: Diagnostics {
    /// Fetch a column description using the column index.
    ///
    /// # Parameters
    ///
    /// * `column_number`: Column index. `0` is the bookmark column. The other column indices start
    ///   with `1`.
    /// * `column_description`: Holds the description of the column after the call. This method does
    ///   not provide strong exception safety as the value of this argument is undefined in case of
    ///   an error.
    fn describe_col(
        &self,
        column_number: u16,
        column_description: &mut ColumnDescription,
    ) -> SqlResult<()>;

    /// Binds application data buffers to columns in the result set.
    ///
    /// * `column_number`: `0` is the bookmark column. All other columns are numbered starting with
    ///   `1`.
    /// * `target_type`: The identifier of the C data type of the `value` buffer. When it is
    ///   retrieving data from the data source with `fetch`, the driver converts the data to this
    ///   type.
    /// * `target_value`: Pointer to the data buffer to bind to the column.
    /// * `target_length`: Length of target value in bytes.
    /// * `indicator`: Buffer is going to hold length or indicator values.
    ///
    /// # Safety
    ///
    /// It is the callers responsibility to make sure the bound columns live until they are no
    /// longer bound.
    unsafe fn bind_col(
        &mut self,
        column_number: u16,
        target_type: CDataType,
        target_value: Pointer,
        target_length: Len,
        indicator: *mut Len,
    ) -> SqlResult<()>;

    /// Returns the next row of the result set and fills all bound buffers. [`SqlResult::NoData`]
    /// signals the end of the result set.
    fn fetch(&mut self) -> SqlResult<()>;

    /// Release all column buffers bound by `bind_col`. Except bookmark column.
    fn unbind_cols(&mut self) -> SqlResult<()>;
}

/// A borrowed, valid (i.e. successfully allocated) ODBC statement handle. The handle is owned by
/// whoever executed the query, so dropping a `StatementRef` does not free it.
pub struct StatementRef<'s> {
    parent: PhantomData<&'s HDbc>,
    handle: HStmt,
}

unsafe impl AsHandle for StatementRef<'_> {
    fn as_handle(&self) -> Handle {
        self.handle.as_handle()
    }

    fn handle_type(&self) -> HandleType {
        HandleType::Stmt
    }
}

impl StatementRef<'_> {
    /// # Safety
    ///
    /// `handle` must be a valid (successfully allocated) statement handle, which outlives the
    /// returned instance.
    pub unsafe fn new(handle: HStmt) -> Self {
        Self {
            handle,
            parent: PhantomData,
        }
    }

    /// The raw underlying statement handle.
    pub fn as_sys(&self) -> HStmt {
        self.handle
    }
}

impl Statement for StatementRef<'_> {
    fn describe_col(
        &self,
        column_number: u16,
        column_description: &mut ColumnDescription,
    ) -> SqlResult<()> {
        let name = &mut column_description.name;
        // Use maximum available capacity.
        name.resize(name.capacity(), 0);
        let mut name_length: i16 = 0;
        let mut data_type = SqlDataType::UNKNOWN_TYPE;
        let mut column_size = 0;
        let mut decimal_digits = 0;
        let mut nullable = odbc_sys::Nullability::UNKNOWN;

        let res = unsafe {
            sql_describe_col(
                self.handle,
                column_number,
                mut_buf_ptr(name),
                clamp_small_int(name.len()),
                &mut name_length,
                &mut data_type,
                &mut column_size,
                &mut decimal_digits,
                &mut nullable,
            )
            .into_sql_result("SQLDescribeCol")
        };

        if res.is_err() {
            return res;
        }

        column_description.nullability = Nullability::new(nullable);

        if name_length + 1 > clamp_small_int(name.len()) {
            // Buffer is to small to hold name, retry with larger buffer
            name.resize(name_length as usize + 1, 0);
            self.describe_col(column_number, column_description)
        } else {
            name.resize(name_length as usize, 0);
            column_description.data_type = DataType::new(data_type, column_size, decimal_digits);
            res
        }
    }

    unsafe fn bind_col(
        &mut self,
        column_number: u16,
        target_type: CDataType,
        target_value: Pointer,
        target_length: Len,
        indicator: *mut Len,
    ) -> SqlResult<()> {
        unsafe {
            SQLBindCol(
                self.handle,
                column_number,
                target_type,
                target_value,
                target_length,
                indicator,
            )
        }
        .into_sql_result("SQLBindCol")
    }

    fn fetch(&mut self) -> SqlResult<()> {
        unsafe { SQLFetch(self.handle) }.into_sql_result("SQLFetch")
    }

    fn unbind_cols(&mut self) -> SqlResult<()> {
        unsafe { SQLFreeStmt(self.handle, FreeStmtOption::Unbind) }.into_sql_result("SQLFreeStmt")
    }
}
