//! Provides basic abstraction over valid (i.e. allocated) ODBC statement handles, together with the
//! diagnostics needed to make sense of failed calls.
//!
//! Two decisions are already baked into this module:
//!
//! * Treat warnings by logging them with `log`.
//! * Use the Unicode (wide) variants of the ODBC API on windows and the narrow variants on any
//!   other platform, unless overwritten by the `narrow` or `wide` features.
//!
//! Nothing in here knows about into targets. It is the thin layer on top of `odbc-sys` the
//! [`crate::IntoBinder`] talks to.

mod as_handle;
mod buffer;
mod column_description;
mod data_type;
mod diagnostics;
mod logging;
mod sql_char;
mod sql_result;
mod statement;

pub use self::{
    as_handle::AsHandle,
    column_description::{ColumnDescription, Nullability},
    data_type::DataType,
    diagnostics::{DiagnosticResult, Diagnostics, Record, State},
    logging::log_diagnostics,
    sql_char::{slice_to_utf8, SqlChar},
    sql_result::{ExtSqlReturn, SqlResult},
    statement::{Statement, StatementRef},
};
