use std::{marker::PhantomData, mem::size_of};

use log::{debug, warn};
use odbc_sys::{CDataType, Len, Pointer, Timestamp};
use widestring::{WideChar, WideString};

use crate::{
    Error, IntoOptions,
    codec::{self, wide},
    conversion::{text_to_i64, text_to_u64, timestamp_to_date_time},
    error::ExtendResult,
    exchange::{NativeExchange, NativeType, ScratchBuffer},
    fixed_sized::Pod,
    handles::{ColumnDescription, Statement},
    indicator::LengthIndicator,
    target::{ExchangeType, Indicator, IntoTarget},
};

/// Binds one application variable to one column of a result set and converts the fetched values
/// into it.
///
/// The lifecycle of a binder is `bind`, then `post_fetch` after each call to `SQLFetch`, then
/// `clean_up`. Most applications let an [`crate::IntoCursor`] drive it.
///
/// Fixed size numbers are bound directly, so the driver writes them into the variable on fetch.
/// Everything else is fetched into a buffer owned by the binder and converted in
/// [`Self::post_fetch`].
#[derive(Debug)]
pub struct IntoBinder<'t> {
    target: IntoTarget<'t>,
    options: IntoOptions,
    state: BinderState,
}

#[derive(Debug)]
enum BinderState {
    Unbound,
    Bound(ColumnBinding),
    Cleaned,
}

#[derive(Debug)]
struct ColumnBinding {
    position: u16,
    native_type: NativeType,
    c_type: CDataType,
    buffer: Option<ScratchBuffer>,
    /// Boxed, so the address registered with the driver survives moving the binder.
    indicator: Box<isize>,
    /// The driver writes into the buffers on the thread fetching from the statement.
    _not_send: PhantomData<*mut ()>,
}

impl<'t> IntoBinder<'t> {
    pub fn new(target: impl Into<IntoTarget<'t>>, options: IntoOptions) -> Self {
        IntoBinder {
            target: target.into(),
            options,
            state: BinderState::Unbound,
        }
    }

    /// Describes the column at `position`, allocates a buffer fitting its type and size and binds
    /// it (or the variable itself) to the column using `SQLBindCol`. `position` is incremented,
    /// even if binding fails, so it points to the next column.
    ///
    /// # Safety
    ///
    /// The driver writes into the bound buffers on every fetch. The binder must neither be dropped
    /// nor cleaned up before the columns of `statement` are unbound (`SQLFreeStmt` with
    /// `SQL_UNBIND`), or the statement is no longer fetched from.
    ///
    /// # Panics
    ///
    /// If the binder is already bound.
    pub unsafe fn bind(
        &mut self,
        statement: &mut (impl Statement + ?Sized),
        position: &mut u16,
    ) -> Result<(), Error> {
        if let BinderState::Bound(binding) = &self.state {
            panic!("Into element is already bound to column #{}.", binding.position);
        }
        let column_number = *position;
        // Column numbers beyond `u16::MAX` do not exist, so describing the column fails anyway.
        *position = position.wrapping_add(1);

        let mut description = ColumnDescription::default();
        statement
            .describe_col(column_number, &mut description)
            .into_result(&*statement)?;
        let native_type = NativeType::from_data_type(&description.data_type);
        let exchange_type = self.target.exchange_type();

        let NativeExchange { c_type, mut buffer } = NativeExchange::select(
            exchange_type,
            native_type,
            description.data_type.column_size(),
            &self.options,
        )
        .ok_or(Error::UnsupportedType {
            position: column_number,
            exchange_type,
        })?;
        if matches!(exchange_type, ExchangeType::Int64 | ExchangeType::UInt64) && buffer.is_some() {
            debug!(
                "Column #{column_number} is fetched as text, since 64 Bit integers are not \
                supported natively."
            );
        }

        let (value_ptr, buffer_length) = match &mut buffer {
            Some(buffer) => (buffer.mut_value_ptr(), buffer.buffer_length()),
            None => direct_value(&mut self.target),
        };
        let mut indicator: Box<Len> = Box::new(0);
        unsafe {
            statement.bind_col(
                column_number,
                c_type,
                value_ptr,
                buffer_length,
                indicator.as_mut() as *mut Len,
            )
        }
        .into_result(&*statement)
        .provide_context_for_diagnostic(|record, _function| Error::DriverBinding {
            position: column_number,
            record,
        })?;

        debug!(
            "Bound column #{column_number} '{}' as {c_type:?} with a buffer length of \
            {buffer_length} bytes.",
            description.name_to_string()
        );
        self.state = BinderState::Bound(ColumnBinding {
            position: column_number,
            native_type,
            c_type,
            buffer,
            indicator,
            _not_send: PhantomData,
        });
        Ok(())
    }

    /// Called before each fetch. Nothing to prepare for bound columns.
    pub fn pre_fetch(&mut self) {}

    /// Converts the value fetched into the buffer into the variable.
    ///
    /// # Parameters
    ///
    /// * `got_data`: `true` if the preceding fetch returned a row. Nothing happens otherwise.
    /// * `_called_from_fetch`: `true` if called as part of fetching the next row, rather than for
    ///   a statement executed with data already fetched. Both are handled alike.
    /// * `indicator`: Receives [`Indicator::Null`] for `NULL` and [`Indicator::Ok`] for values.
    ///   Fetching `NULL` without an indicator is an error.
    ///
    /// # Panics
    ///
    /// If `got_data` is `true` and the binder is not bound.
    pub fn post_fetch(
        &mut self,
        got_data: bool,
        _called_from_fetch: bool,
        indicator: Option<&mut Indicator>,
    ) -> Result<(), Error> {
        if !got_data {
            // End of result set
            return Ok(());
        }

        let IntoBinder {
            target,
            options,
            state,
        } = self;
        let BinderState::Bound(binding) = state else {
            panic!("Into element must be bound to a column before values are fetched into it.");
        };
        let length = LengthIndicator::from_isize(*binding.indicator);
        if length.is_null() {
            return match indicator {
                Some(indicator) => {
                    *indicator = Indicator::Null;
                    Ok(())
                }
                None => Err(Error::NullWithoutIndicator {
                    position: binding.position,
                }),
            };
        }
        if let Some(indicator) = indicator {
            *indicator = Indicator::Ok;
        }
        binding.convert(target, length, options)
    }

    /// Releases the buffer. Calling it more than once, or without binding first, does nothing.
    ///
    /// The columns must have been unbound before, if the statement is fetched from again.
    pub fn clean_up(&mut self) {
        self.state = BinderState::Cleaned;
    }

    /// Semantic type of the variable.
    pub fn exchange_type(&self) -> ExchangeType {
        self.target.exchange_type()
    }

    /// C data type the column is bound as. `None` if not bound.
    pub fn c_data_type(&self) -> Option<CDataType> {
        self.binding().map(|b| b.c_type)
    }

    /// One based position of the bound column. `None` if not bound.
    pub fn position(&self) -> Option<u16> {
        self.binding().map(|b| b.position)
    }

    /// Capacity of the buffer in characters, including the terminating zero. `1` for timestamps,
    /// `0` if the variable is bound directly or the binder is not bound.
    pub fn buffer_capacity(&self) -> usize {
        self.binding()
            .and_then(|b| b.buffer.as_ref())
            .map(ScratchBuffer::capacity)
            .unwrap_or(0)
    }

    /// Encoding of the bound column as described by the driver. `None` if not bound.
    pub fn native_type(&self) -> Option<NativeType> {
        self.binding().map(|b| b.native_type)
    }

    pub fn target(&self) -> &IntoTarget<'t> {
        &self.target
    }

    fn binding(&self) -> Option<&ColumnBinding> {
        match &self.state {
            BinderState::Bound(binding) => Some(binding),
            BinderState::Unbound | BinderState::Cleaned => None,
        }
    }
}

/// Pointer and length for variables the driver writes into directly.
fn direct_value(target: &mut IntoTarget) -> (Pointer, Len) {
    fn bind_to<T: Pod>(value: &mut T) -> (Pointer, Len) {
        (value.mut_value_ptr(), T::buffer_length())
    }

    match target {
        IntoTarget::I8(value) => bind_to(&mut **value),
        IntoTarget::U8(value) => bind_to(&mut **value),
        IntoTarget::I16(value) => bind_to(&mut **value),
        IntoTarget::U16(value) => bind_to(&mut **value),
        IntoTarget::I32(value) => bind_to(&mut **value),
        IntoTarget::U32(value) => bind_to(&mut **value),
        IntoTarget::I64(value) => bind_to(&mut **value),
        IntoTarget::U64(value) => bind_to(&mut **value),
        IntoTarget::Double(value) => bind_to(&mut **value),
        IntoTarget::RowId(value) => bind_to(&mut **value),
        other => unreachable!(
            "{:?} requires a buffer and can not be bound directly.",
            other.exchange_type()
        ),
    }
}

/// Valid part of a text buffer after a fetch.
enum Text<'b> {
    Narrow(&'b [u8]),
    Wide(&'b [u16]),
}

impl<'b> Text<'b> {
    fn size_in_bytes(&self) -> usize {
        match self {
            Text::Narrow(bytes) => bytes.len(),
            Text::Wide(units) => units.len() * size_of::<u16>(),
        }
    }

    /// Drops the trailing character the driver has cut in half while truncating the value. Returns
    /// the complete characters and the number of units dropped.
    fn complete(self, length: LengthIndicator) -> (Self, usize) {
        if !length.is_truncated(self.size_in_bytes()) {
            return (self, 0);
        }
        match self {
            Text::Narrow(bytes) => {
                let complete = match std::str::from_utf8(bytes) {
                    // Sequence ends early, rather than containing invalid bytes
                    Err(error) if error.error_len().is_none() => error.valid_up_to(),
                    _ => bytes.len(),
                };
                (Text::Narrow(&bytes[..complete]), bytes.len() - complete)
            }
            Text::Wide(units) => match units.split_last() {
                Some((0xD800..=0xDBFF, rest)) => (Text::Wide(rest), 1),
                _ => (Text::Wide(units), 0),
            },
        }
    }

    fn to_utf8(&self, position: u16) -> Result<String, Error> {
        match self {
            Text::Narrow(bytes) => codec::narrow_to_utf8(bytes).map_err(|_| Error::InvalidText {
                position,
                encoding: "UTF-8",
            }),
            Text::Wide(units) => codec::utf16_to_utf8(units).map_err(|_| Error::InvalidText {
                position,
                encoding: "UTF-16",
            }),
        }
    }

    fn to_wide_string(&self, position: u16) -> Result<WideString, Error> {
        match self {
            Text::Narrow(_) => self.to_utf8(position).map(|text| wide::from_utf8(&text)),
            Text::Wide(units) => wide::from_utf16(units).map_err(|_| Error::InvalidText {
                position,
                encoding: "UTF-16",
            }),
        }
    }
}

/// Cuts the text at the first terminating zero.
fn until_nul<T: Copy + Default + PartialEq>(units: &[T]) -> &[T] {
    let end = units
        .iter()
        .position(|&unit| unit == T::default())
        .unwrap_or(units.len());
    &units[..end]
}

impl ColumnBinding {
    fn text(&self, length: LengthIndicator) -> Option<Text<'_>> {
        let (text, unit_size) = match self.buffer.as_ref()? {
            ScratchBuffer::Narrow(buffer) => {
                let units = length.units_in_buffer(buffer.len(), 1);
                (Text::Narrow(until_nul(&buffer[..units])), 1)
            }
            ScratchBuffer::Wide(buffer) => {
                let units = length.units_in_buffer(buffer.len(), size_of::<u16>());
                (Text::Wide(until_nul(&buffer[..units])), size_of::<u16>())
            }
            ScratchBuffer::Timestamp(_) => return None,
        };
        let units_fetched = text.size_in_bytes() / unit_size;
        if length.is_truncated(text.size_in_bytes()) {
            warn!(
                "Value of column #{} has been truncated to {units_fetched} characters.",
                self.position
            );
        }
        Some(text)
    }

    fn timestamp(&self) -> Option<&Timestamp> {
        match self.buffer.as_ref()? {
            ScratchBuffer::Timestamp(timestamp) => Some(timestamp),
            ScratchBuffer::Narrow(_) | ScratchBuffer::Wide(_) => None,
        }
    }

    fn convert(
        &self,
        target: &mut IntoTarget,
        length: LengthIndicator,
        options: &IntoOptions,
    ) -> Result<(), Error> {
        let position = self.position;
        match (target, self.text(length)) {
            (IntoTarget::Char(value), Some(Text::Narrow(bytes))) => {
                **value = bytes.first().copied().unwrap_or(0);
            }
            (IntoTarget::WChar(value), Some(Text::Wide(units))) => {
                **value = first_wide_char(units).ok_or(Error::InvalidText {
                    position,
                    encoding: "UTF-16",
                })?;
            }
            // A character cut in half still counts towards the length the driver filled in.
            (IntoTarget::String(value), Some(text)) => {
                let (text, partial) = text.complete(length);
                let text = text.to_utf8(position)?;
                let limit = options.fallback_buffer_length.saturating_sub(1);
                check_length(position, text.len() + partial, limit)?;
                **value = text;
            }
            (IntoTarget::WString(value), Some(text)) => {
                let (text, partial) = text.complete(length);
                let text = text.to_wide_string(position)?;
                let limit =
                    options.fallback_buffer_length.saturating_sub(1) / size_of::<WideChar>();
                check_length(position, text.len() + partial, limit)?;
                **value = text;
            }
            (IntoTarget::LongString(value), Some(text)) => {
                value.value = text.complete(length).0.to_utf8(position)?;
            }
            (IntoTarget::Xml(value), Some(text)) => {
                value.value = text.complete(length).0.to_utf8(position)?;
            }
            (IntoTarget::I64(value), Some(Text::Narrow(bytes))) => {
                **value = text_to_i64(bytes).ok_or_else(|| integer_parse(position, bytes))?;
            }
            (IntoTarget::U64(value), Some(Text::Narrow(bytes))) => {
                **value = text_to_u64(bytes).ok_or_else(|| integer_parse(position, bytes))?;
            }
            (IntoTarget::Timestamp(value), None) => {
                let timestamp = self
                    .timestamp()
                    .and_then(timestamp_to_date_time)
                    .ok_or(Error::TimestampOutOfRange { position })?;
                **value = timestamp;
            }
            // Bound directly. The driver already wrote the value into the variable.
            (_, None) => (),
            (target, Some(_)) => unreachable!(
                "{:?} bound with a text buffer of the wrong encoding.",
                target.exchange_type()
            ),
        }
        Ok(())
    }
}

fn first_wide_char(units: &[u16]) -> Option<WideChar> {
    wide::first_char(units).ok()
}

fn check_length(position: u16, length: usize, limit: usize) -> Result<(), Error> {
    if length >= limit {
        Err(Error::BufferOverflow {
            position,
            length,
            limit,
        })
    } else {
        Ok(())
    }
}

fn integer_parse(position: u16, bytes: &[u8]) -> Error {
    Error::IntegerParse {
        position,
        text: String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{IntoBinder, Text, check_length, until_nul};
    use crate::{Error, IntoOptions, indicator::LengthIndicator, target::Indicator};

    #[test]
    fn clean_up_without_bind() {
        let mut value = 0i32;
        let mut binder = IntoBinder::new(&mut value, IntoOptions::default());
        binder.clean_up();
        binder.clean_up();
        assert_eq!(None, binder.position());
        assert_eq!(0, binder.buffer_capacity());
    }

    #[test]
    fn no_data_is_a_no_op_even_if_unbound() {
        let mut value = String::new();
        let mut binder = IntoBinder::new(&mut value, IntoOptions::default());
        let mut indicator = Indicator::Ok;
        binder.post_fetch(false, true, Some(&mut indicator)).unwrap();
        binder.post_fetch(false, false, None).unwrap();
        assert_eq!(Indicator::Ok, indicator);
    }

    #[test]
    #[should_panic(expected = "must be bound")]
    fn fetching_into_unbound_binder_panics() {
        let mut value = 0.0f64;
        let mut binder = IntoBinder::new(&mut value, IntoOptions::default());
        let _ = binder.post_fetch(true, true, None);
    }

    #[test]
    fn text_ends_at_terminating_zero() {
        assert_eq!(b"ab", until_nul(b"ab\0cd"));
        assert_eq!(&[1u16, 2], until_nul(&[1u16, 2]));
        assert!(until_nul::<u16>(&[0, 1]).is_empty());
    }

    #[test]
    fn character_cut_in_half_is_dropped() {
        let truncated = LengthIndicator::Length(10);

        let (text, partial) = Text::Narrow(&"abé".as_bytes()[..3]).complete(truncated);
        assert!(matches!(text, Text::Narrow(b"ab")));
        assert_eq!(1, partial);

        let units: Vec<u16> = "a😀".encode_utf16().collect();
        let (text, partial) = Text::Wide(&units[..2]).complete(truncated);
        assert!(matches!(text, Text::Wide([0x61])));
        assert_eq!(1, partial);
    }

    #[test]
    fn complete_or_invalid_text_is_kept() {
        // Not truncated, so the invalid byte is reported on decoding
        let (text, partial) = Text::Narrow(b"ab\xC3").complete(LengthIndicator::Length(3));
        assert!(matches!(text, Text::Narrow(b"ab\xC3")));
        assert_eq!(0, partial);

        // Invalid in the middle, rather than cut at the end
        let (text, partial) = Text::Narrow(b"a\xFFb").complete(LengthIndicator::NoTotal);
        assert!(matches!(text, Text::Narrow(b"a\xFFb")));
        assert_eq!(0, partial);
    }

    #[test]
    fn length_limit_is_exclusive() {
        assert!(check_length(1, 98, 99).is_ok());
        assert!(matches!(
            check_length(3, 99, 99),
            Err(Error::BufferOverflow {
                position: 3,
                length: 99,
                limit: 99
            })
        ));
    }
}
