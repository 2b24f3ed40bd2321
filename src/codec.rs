//! Conversions between the text encodings ODBC hands out and the string types of the application.
//!
//! Drivers deliver `SQL_C_WCHAR` data as UTF-16. Rust `String`s are UTF-8 and the platform wide
//! string ([`widestring::WideString`]) is UTF-32 on most platforms, yet UTF-16 on windows. Both
//! wide codecs are always compiled, [`wide`] refers to the one matching [`widestring::WideChar`].

use std::{char::DecodeUtf16Error, str::Utf8Error};

#[cfg(windows)]
pub use self::utf16 as wide;
#[cfg(not(windows))]
pub use self::utf32 as wide;

/// Decodes UTF-16 code units into a `String`.
pub fn utf16_to_utf8(units: &[u16]) -> Result<String, DecodeUtf16Error> {
    char::decode_utf16(units.iter().copied()).collect()
}

/// Interprets narrow text as UTF-8.
pub fn narrow_to_utf8(bytes: &[u8]) -> Result<String, Utf8Error> {
    std::str::from_utf8(bytes).map(str::to_owned)
}

/// Wide strings made of 16 Bit characters. UTF-16 is passed through unaltered.
pub mod utf16 {
    use std::char::DecodeUtf16Error;

    use widestring::U16String;

    /// Copies the UTF-16 code units. Unpaired surrogates are reported as an error nevertheless,
    /// since they would not survive the conversion on other platforms either.
    pub fn from_utf16(units: &[u16]) -> Result<U16String, DecodeUtf16Error> {
        if let Some(Err(error)) = char::decode_utf16(units.iter().copied()).find(Result::is_err) {
            return Err(error);
        }
        Ok(U16String::from_vec(units))
    }

    pub fn from_utf8(text: &str) -> U16String {
        U16String::from_str(text)
    }

    /// The first code unit. Characters outside of the basic multilingual plane can not be
    /// represented in a single 16 Bit character, so this is the high surrogate for them. `Ok(0)`
    /// for empty input. Never fails, yet shares its signature with [`super::utf32::first_char`].
    pub fn first_char(units: &[u16]) -> Result<u16, DecodeUtf16Error> {
        Ok(units.first().copied().unwrap_or(0))
    }
}

/// Wide strings made of 32 Bit characters, holding one unicode scalar value each.
pub mod utf32 {
    use std::char::DecodeUtf16Error;

    use widestring::U32String;

    /// Decodes UTF-16, joining surrogate pairs into one character.
    pub fn from_utf16(units: &[u16]) -> Result<U32String, DecodeUtf16Error> {
        let chars = char::decode_utf16(units.iter().copied()).collect::<Result<Vec<char>, _>>()?;
        Ok(U32String::from_chars(chars))
    }

    pub fn from_utf8(text: &str) -> U32String {
        U32String::from_str(text)
    }

    /// The first unicode scalar of the UTF-16 sequence. `Ok(0)` for empty input.
    pub fn first_char(units: &[u16]) -> Result<u32, DecodeUtf16Error> {
        match char::decode_utf16(units.iter().copied()).next() {
            Some(Ok(c)) => Ok(c as u32),
            Some(Err(error)) => Err(error),
            None => Ok(0),
        }
    }
}
