use odbc_sys::{NO_TOTAL, NULL_DATA};

/// Length or null indicator as written by the driver into the indicator buffer of a bound column.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LengthIndicator {
    /// Field does not exist
    Null,
    /// Field exists, but its length had not be reported by the driver.
    NoTotal,
    /// Fields exists. Value indicates number of bytes required to store the value. In case of
    /// truncated data, this is the true length of the data, before truncation occurred.
    Length(usize),
}

impl LengthIndicator {
    /// Creates an indicator from an `isize` indicator value returned by ODBC.
    ///
    /// Negative values other than the two special values would be an error of the driver. They are
    /// treated like [`LengthIndicator::NoTotal`], so the length is determined from the terminating
    /// zero instead.
    pub fn from_isize(indicator: isize) -> Self {
        match indicator {
            NULL_DATA => LengthIndicator::Null,
            NO_TOTAL => LengthIndicator::NoTotal,
            other => match usize::try_from(other) {
                Ok(length) => LengthIndicator::Length(length),
                Err(_) => {
                    log::warn!(
                        "Driver reported a negative length indicator ({other}). Some drivers \
                        assume SQLLEN to be 32 Bit even on 64 Bit platforms. Falling back to \
                        terminating zero."
                    );
                    LengthIndicator::NoTotal
                }
            },
        }
    }

    /// Does this indicator imply truncation for a value of the given length?
    ///
    /// `length_in_buffer` is specified in bytes without terminating zeroes.
    pub fn is_truncated(self, length_in_buffer: usize) -> bool {
        match self {
            LengthIndicator::Null => false,
            LengthIndicator::NoTotal => true,
            LengthIndicator::Length(complete_length) => complete_length > length_in_buffer,
        }
    }

    /// Only `true` if the indicator is the equivalent to [`odbc_sys::NULL_DATA`], indicating a
    /// non-existing value.
    pub fn is_null(self) -> bool {
        match self {
            LengthIndicator::Null => true,
            LengthIndicator::NoTotal | LengthIndicator::Length(_) => false,
        }
    }

    /// Number of valid units in a text buffer holding `capacity` units of `unit_size` bytes each,
    /// including one unit reserved for the terminating zero.
    pub fn units_in_buffer(self, capacity: usize, unit_size: usize) -> usize {
        let max_units = capacity.saturating_sub(1);
        match self {
            LengthIndicator::Null => 0,
            LengthIndicator::NoTotal => max_units,
            LengthIndicator::Length(bytes) => (bytes / unit_size).min(max_units),
        }
    }
}

#[cfg(test)]
mod tests {
    use odbc_sys::{NO_TOTAL, NULL_DATA};

    use super::LengthIndicator;

    #[test]
    fn special_values() {
        assert_eq!(LengthIndicator::Null, LengthIndicator::from_isize(NULL_DATA));
        assert_eq!(LengthIndicator::NoTotal, LengthIndicator::from_isize(NO_TOTAL));
        assert_eq!(LengthIndicator::Length(5), LengthIndicator::from_isize(5));
        assert!(LengthIndicator::from_isize(NULL_DATA).is_null());
    }

    #[test]
    fn units_are_clamped_to_capacity() {
        // Wide buffer with room for 3 characters and the terminating zero
        assert_eq!(2, LengthIndicator::Length(4).units_in_buffer(4, 2));
        assert_eq!(3, LengthIndicator::Length(100).units_in_buffer(4, 2));
        assert_eq!(3, LengthIndicator::NoTotal.units_in_buffer(4, 2));
    }

    #[test]
    fn truncation() {
        assert!(LengthIndicator::Length(10).is_truncated(9));
        assert!(!LengthIndicator::Length(9).is_truncated(9));
        assert!(LengthIndicator::NoTotal.is_truncated(9));
    }
}
