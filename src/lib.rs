//! # ODBC into
//!
//! Binds typed application variables ("into" elements) to the columns of an ODBC result set and
//! converts the values the driver fetches into them.
//!
//! Fixed size numbers are bound directly to the variable. Text, 64 Bit integers on drivers without
//! native support for them and timestamps are fetched into buffers owned by an [`IntoBinder`] and
//! converted after each row. Text is fetched as UTF-16 from wide columns (`NVARCHAR` and friends)
//! and as UTF-8 from narrow ones, regardless of whether the variable is a `String` or a
//! `WideString`.
//!
//! ```no_run
//! use odbc_into::{IntoCursor, IntoOptions, IntoTarget, handles::StatementRef, sys::HStmt};
//!
//! # fn fetch_all(hstmt: HStmt) -> Result<(), odbc_into::Error> {
//! let mut id = 0i32;
//! let mut name = String::new();
//! // An executed statement handle owned by whoever executed the query
//! let statement = unsafe { StatementRef::new(hstmt) };
//! let mut cursor = IntoCursor::new(statement, IntoOptions::default());
//! cursor.bind(&mut id)?;
//! cursor.bind_with_indicator(&mut name)?;
//! while cursor.fetch()? {
//!     if let (IntoTarget::I32(id), IntoTarget::String(name)) = (cursor.target(0), cursor.target(1))
//!     {
//!         println!("{id}: {name}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod binder;
pub mod codec;
mod conversion;
mod cursor;
mod error;
mod exchange;
mod fixed_sized;
mod indicator;
mod options;
mod quirks;
mod target;

pub mod handles;

pub use self::{
    binder::IntoBinder,
    cursor::IntoCursor,
    error::Error,
    exchange::NativeType,
    fixed_sized::Pod,
    indicator::LengthIndicator,
    options::{FALLBACK_BUFFER_LENGTH, IntoOptions, MAX_COLUMN_SIZE},
    quirks::Quirks,
    target::{ExchangeType, Indicator, IntoTarget, LongString, RowId, XmlType},
};
// Reexports
/// Reexports `odbc-sys` as sys to enable applications to always use the same version as this crate.
pub use odbc_sys as sys;
/// Reexports `chrono` date time, which timestamps are fetched into.
pub use chrono::NaiveDateTime;
pub use widestring::{WideChar, WideString};
