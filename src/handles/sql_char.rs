//! The idea is to handle most of the conditional compilation around different SQL character types
//! in this module, so the rest of the crate doesn't have to.
//!
//! This only concerns the character type used by function calls like `SQLDescribeCol` or
//! `SQLGetDiagRec`. The encoding of the column payload is decided per column.

use std::borrow::Cow;

#[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
pub type SqlChar = u8;
#[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
pub type SqlChar = u16;

/// Converts a slice of [`SqlChar`] into UTF-8. Invalid sequences are replaced with the replacement
/// character. Used for column names and diagnostic messages, which are never fatal to decode.
#[cfg(not(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows"))))]
pub fn slice_to_cow_utf8(text: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(text)
}

/// Converts a slice of [`SqlChar`] into UTF-8. Invalid sequences are replaced with the replacement
/// character. Used for column names and diagnostic messages, which are never fatal to decode.
#[cfg(any(feature = "wide", all(not(feature = "narrow"), target_os = "windows")))]
pub fn slice_to_cow_utf8(text: &[u16]) -> Cow<'_, str> {
    Cow::Owned(
        char::decode_utf16(text.iter().copied())
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}

/// Owned variant of [`slice_to_cow_utf8`].
pub fn slice_to_utf8(text: &[SqlChar]) -> String {
    slice_to_cow_utf8(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::{SqlChar, slice_to_utf8};

    #[test]
    fn ascii_survives_either_flavour() {
        let text: Vec<SqlChar> = b"column_name".iter().map(|&b| b as SqlChar).collect();
        assert_eq!("column_name", slice_to_utf8(&text));
    }
}
