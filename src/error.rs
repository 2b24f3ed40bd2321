use thiserror::Error as ThisError;

use crate::{
    handles::{Diagnostics, Record as DiagnosticRecord, SqlResult, log_diagnostics},
    target::ExchangeType,
};

#[derive(Debug, ThisError)]
/// Error type used by this crate. Everything but [`Error::Diagnostics`] and
/// [`Error::NoDiagnostics`] is specific to binding and converting a single result column, and
/// carries the one based position of that column.
pub enum Error {
    /// This should never happen, given that ODBC driver manager and ODBC driver do not have any
    /// Bugs. Since we may link vs a bunch of these, better to be on the safe side.
    #[error(
        "No Diagnostics available. The ODBC function call to {} returned an error. Sadly neither \
        the ODBC driver manager, nor the driver were polite enough to leave a diagnostic record \
        specifying what exactly went wrong.",
        function
    )]
    NoDiagnostics {
        /// ODBC API call which returned error without producing a diagnostic record.
        function: &'static str,
    },
    /// SQL Error had been returned by a low level ODBC function call. A Diagnostic record is
    /// obtained and associated with this error.
    #[error("ODBC emitted an error calling '{function}':\n{record}")]
    Diagnostics {
        /// Diagnostic record returned by the ODBC driver manager
        record: DiagnosticRecord,
        /// ODBC API call which produced the diagnostic record
        function: &'static str,
    },
    /// The variable is of a type which can not be fetched into.
    #[error("Into element used with non-supported type {exchange_type:?} in column #{position}.")]
    UnsupportedType {
        position: u16,
        exchange_type: ExchangeType,
    },
    /// `SQLBindCol` failed.
    #[error("Binding output column #{position} failed:\n{record}")]
    DriverBinding {
        position: u16,
        /// Diagnostic record returned by the driver for `SQLBindCol`.
        record: DiagnosticRecord,
    },
    /// The application fetched into a variable without indicator, as if the value could never be
    /// `NULL`, yet the data source returned `NULL`.
    #[error("Null value fetched and no indicator defined. Column #{position}.")]
    NullWithoutIndicator { position: u16 },
    /// The fetched text filled the fallback buffer almost completely, so it has likely been
    /// truncated by the driver.
    #[error(
        "Buffer size overflow; maybe got too large string. Column #{position} fetched a value with \
        a length of {length}, which reaches the limit of {limit}. Consider increasing the fallback \
        buffer length."
    )]
    BufferOverflow {
        position: u16,
        /// Length of the decoded value in units of the target string.
        length: usize,
        /// Length at which the value is considered truncated.
        limit: usize,
    },
    /// A 64 Bit integer fetched as text could not be parsed.
    #[error("Failed to parse the returned 64-bit integer value '{text}' in column #{position}.")]
    IntegerParse { position: u16, text: String },
    /// The driver returned text which is not valid in the encoding of the exchange buffer.
    #[error("Column #{position} returned text which is not valid {encoding}.")]
    InvalidText {
        position: u16,
        /// Either `"UTF-8"` or `"UTF-16"`.
        encoding: &'static str,
    },
    /// The timestamp returned by the driver can not be represented after normalizing its fields.
    #[error("Column #{position} returned a timestamp which is out of range.")]
    TimestampOutOfRange { position: u16 },
}

impl Error {
    /// Allows for mapping the error variant from the "catch all" diagnostic to a more specific one
    /// offering the oppertunity to provide context in the error message.
    fn provide_context_for_diagnostic<F>(self, f: F) -> Self
    where
        F: FnOnce(DiagnosticRecord, &'static str) -> Error,
    {
        if let Error::Diagnostics { record, function } = self {
            f(record, function)
        } else {
            self
        }
    }
}

/// Convinience for easily providing more context to errors without an additional call to `map_err`
pub(crate) trait ExtendResult {
    fn provide_context_for_diagnostic<F>(self, f: F) -> Self
    where
        F: FnOnce(DiagnosticRecord, &'static str) -> Error;
}

impl<T> ExtendResult for Result<T, Error> {
    fn provide_context_for_diagnostic<F>(self, f: F) -> Self
    where
        F: FnOnce(DiagnosticRecord, &'static str) -> Error,
    {
        self.map_err(|error| error.provide_context_for_diagnostic(f))
    }
}

impl SqlResult<()> {
    /// Use this instead of [`Self::into_result`] if you expect [`SqlResult::NoData`] to be a
    /// valid value. [`SqlResult::NoData`] is mapped to `Ok(false)`, all other success values are
    /// `Ok(true)`.
    pub fn into_result_bool(self, handle: &(impl Diagnostics + ?Sized)) -> Result<bool, Error> {
        self.on_success(|| true).into_result_with(handle, Some(false))
    }
}

// Define that here rather than in `sql_result` mod to keep the `handles` module entirely agnostic
// about the top level `Error` type.
impl<T> SqlResult<T> {
    /// [`Self::Success`] and [`Self::SuccessWithInfo`] are mapped to Ok. In case of
    /// [`Self::SuccessWithInfo`] any diagnostics are logged. [`Self::Error`] is mapped to error.
    pub fn into_result(self, handle: &(impl Diagnostics + ?Sized)) -> Result<T, Error> {
        self.into_result_with(handle, None)
    }

    /// Most flexible way of converting an `SqlResult` to an idiomatic `Result`.
    ///
    /// # Parameters
    ///
    /// * `handle`: This handle is used to extract diagnostics in case `self` is
    ///   [`SqlResult::SuccessWithInfo`] or [`SqlResult::Error`].
    /// * `no_data`: Controls the behaviour for [`SqlResult::NoData`]. `None` indicates that the
    ///   result is never expected to be [`SqlResult::NoData`] and would panic in that case.
    ///   `Some(value)` would cause [`SqlResult::NoData`] to be mapped to `Ok(value)`.
    pub fn into_result_with(
        self,
        handle: &(impl Diagnostics + ?Sized),
        no_data: Option<T>,
    ) -> Result<T, Error> {
        match self {
            // The function has been executed successfully. Holds result.
            SqlResult::Success(value) => Ok(value),
            // The function has been executed successfully. There have been warnings. Holds result.
            SqlResult::SuccessWithInfo(value) => {
                log_diagnostics(handle);
                Ok(value)
            }
            SqlResult::Error { function } => {
                let mut record = DiagnosticRecord::with_capacity(512);
                if record.fill_from(handle, 1) {
                    log_diagnostics(handle);
                    Err(Error::Diagnostics { record, function })
                } else {
                    Err(Error::NoDiagnostics { function })
                }
            }
            SqlResult::NoData => {
                Ok(no_data.expect("Unexepcted SQL_NO_DATA returned by ODBC function"))
            }
        }
    }
}
