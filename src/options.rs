use crate::Quirks;

/// Column size at and above which drivers are assumed to report a placeholder rather than the
/// actual maximum length of a text column. E.g. `VARCHAR(MAX)` is reported with this or a larger
/// value by Microsoft SQL Server.
pub const MAX_COLUMN_SIZE: usize = 8000;

/// Capacity used for text columns then the declared column size can not be trusted.
pub const FALLBACK_BUFFER_LENGTH: usize = 100 * 1024 * 1024;

/// Decides how result columns are bound. Usually created once per connection and passed to every
/// binder created for statements of that connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntoOptions {
    /// Declared column sizes of text columns at or above this value are treated as unknown.
    pub max_column_size: usize,
    /// Capacity (in characters, excluding terminating zero) of the buffer allocated for text
    /// columns whose size is unknown, i.e. reported as `0` or at least `max_column_size`. Values
    /// which (almost) fill this buffer are reported as [`crate::Error::BufferOverflow`] then
    /// fetched into a `String` or `WideString`.
    pub fallback_buffer_length: usize,
    /// Fetch 64 Bit integers as text and parse them, rather than binding them as `SQL_C_SBIGINT`
    /// or `SQL_C_UBIGINT`. Required for drivers without native support for 64 Bit integers.
    pub bigint_as_text: bool,
}

impl IntoOptions {
    /// Options working around the quirks of a specific driver.
    pub fn from_quirks(quirks: &Quirks) -> Self {
        IntoOptions {
            bigint_as_text: quirks.no_native_64_bit_integers,
            ..IntoOptions::default()
        }
    }

    /// Capacity in characters (including the terminating zero) of a buffer for a text column with
    /// the declared `column_size`.
    pub fn text_capacity(&self, column_size: usize) -> usize {
        let length = if column_size >= self.max_column_size || column_size == 0 {
            log::debug!(
                "Column size {column_size} is not trustworthy. Using fallback buffer length of \
                {} characters.",
                self.fallback_buffer_length
            );
            self.fallback_buffer_length
        } else {
            column_size
        };
        length + 1
    }
}

impl Default for IntoOptions {
    fn default() -> Self {
        IntoOptions {
            max_column_size: MAX_COLUMN_SIZE,
            fallback_buffer_length: FALLBACK_BUFFER_LENGTH,
            bigint_as_text: false,
        }
    }
}
