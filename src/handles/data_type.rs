use odbc_sys::{SqlDataType, ULen};

/// Enumeration over valid SQL Data Types supported by ODBC, as reported by `SQLDescribeCol`.
///
/// Text types carry their declared length in characters. Note that drivers report `0` or a huge
/// value for `LONGVARCHAR` like columns (e.g. `VARCHAR(MAX)`), so the length is an upper bound at
/// best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DataType {
    /// The type is not known.
    #[default]
    Unknown,
    /// `Char(n)`. Character string of fixed length.
    Char {
        /// Column size in characters (excluding terminating zero).
        length: ULen,
    },
    /// `NChar(n)`. Character string of fixed length, encoded as UTF-16.
    WChar {
        /// Column size in characters (excluding terminating zero).
        length: ULen,
    },
    /// `Varchar(n)`. Variable length character string.
    Varchar {
        /// Maximum length of the character string (excluding terminating zero).
        length: ULen,
    },
    /// `NVarchar(n)`. Variable length character string, encoded as UTF-16.
    WVarchar {
        /// Maximum length of the character string (excluding terminating zero).
        length: ULen,
    },
    /// `LONGVARCHAR`. Variable length character data. Maximum length is data source dependent.
    LongVarchar {
        /// Maximum length as reported by the driver. Often `0` or meaningless.
        length: ULen,
    },
    /// `NTEXT` and friends. Variable length UTF-16 character data.
    WLongVarchar {
        /// Maximum length as reported by the driver. Often `0` or meaningless.
        length: ULen,
    },
    /// `Numeric(p,s)`. Signed, exact, numeric value with a precision p and scale s.
    Numeric {
        /// Total number of digits.
        precision: ULen,
        /// Number of decimal digits.
        scale: i16,
    },
    /// `Decimal(p,s)`. Signed, exact, numeric value with a precision of at least p and scale s.
    Decimal {
        /// Total number of digits.
        precision: ULen,
        /// Number of decimal digits.
        scale: i16,
    },
    /// `Integer`. 32 Bit Integer
    Integer,
    /// `Smallint`. 16 Bit Integer
    SmallInt,
    /// `TINYINT`. Exact numeric value with precision 3 and scale 0.
    TinyInt,
    /// `BIGINT`. Exact numeric value with precision 19 (if signed) or 20 (if unsigned) and scale 0.
    BigInt,
    /// `Float(p)`. Signed, approximate, numeric value with a binary precision of at least p.
    Float,
    /// `Real`. Signed, approximate, numeric value with a binary precision 24.
    Real,
    /// `Double Precision`. Signed, approximate, numeric value with a binary precision 53.
    Double,
    /// `Date`. Year, month, and day fields, conforming to the rules of the Gregorian calendar.
    Date,
    /// `Time`. Hour, minute, and second fields.
    Time { precision: i16 },
    /// `Timestamp`. Year, month, day, hour, minute, and second fields.
    Timestamp { precision: i16 },
    /// `BIT`. Single bit binary data.
    Bit,
    /// The driver returned a type, but it is not among the other types of these enumeration. This
    /// is a catchall, in case the data source supports custom or non-standard types.
    Other {
        /// Type of the column
        data_type: SqlDataType,
        /// Size of column element
        column_size: ULen,
        decimal_digits: i16,
    },
}

impl DataType {
    pub fn new(data_type: SqlDataType, column_size: ULen, decimal_digits: i16) -> Self {
        match data_type {
            SqlDataType::UNKNOWN_TYPE => DataType::Unknown,
            SqlDataType::CHAR => DataType::Char {
                length: column_size,
            },
            SqlDataType::EXT_W_CHAR => DataType::WChar {
                length: column_size,
            },
            SqlDataType::VARCHAR => DataType::Varchar {
                length: column_size,
            },
            SqlDataType::EXT_W_VARCHAR => DataType::WVarchar {
                length: column_size,
            },
            SqlDataType::EXT_LONG_VARCHAR => DataType::LongVarchar {
                length: column_size,
            },
            SqlDataType::EXT_W_LONG_VARCHAR => DataType::WLongVarchar {
                length: column_size,
            },
            SqlDataType::NUMERIC => DataType::Numeric {
                precision: column_size,
                scale: decimal_digits,
            },
            SqlDataType::DECIMAL => DataType::Decimal {
                precision: column_size,
                scale: decimal_digits,
            },
            SqlDataType::INTEGER => DataType::Integer,
            SqlDataType::SMALLINT => DataType::SmallInt,
            SqlDataType::EXT_TINY_INT => DataType::TinyInt,
            SqlDataType::EXT_BIG_INT => DataType::BigInt,
            SqlDataType::FLOAT => DataType::Float,
            SqlDataType::REAL => DataType::Real,
            SqlDataType::DOUBLE => DataType::Double,
            SqlDataType::DATE => DataType::Date,
            SqlDataType::TIME => DataType::Time {
                precision: decimal_digits,
            },
            SqlDataType::TIMESTAMP => DataType::Timestamp {
                precision: decimal_digits,
            },
            SqlDataType::EXT_BIT => DataType::Bit,
            other => DataType::Other {
                data_type: other,
                column_size,
                decimal_digits,
            },
        }
    }

    /// The column size as reported by the driver. For character types this is the length in
    /// characters, for exact numerics the precision. Zero for fixed size types.
    pub fn column_size(&self) -> ULen {
        match self {
            DataType::Char { length }
            | DataType::WChar { length }
            | DataType::Varchar { length }
            | DataType::WVarchar { length }
            | DataType::LongVarchar { length }
            | DataType::WLongVarchar { length } => *length,
            DataType::Numeric { precision, .. } | DataType::Decimal { precision, .. } => *precision,
            DataType::Other { column_size, .. } => *column_size,
            DataType::Unknown
            | DataType::Integer
            | DataType::SmallInt
            | DataType::TinyInt
            | DataType::BigInt
            | DataType::Float
            | DataType::Real
            | DataType::Double
            | DataType::Date
            | DataType::Time { .. }
            | DataType::Timestamp { .. }
            | DataType::Bit => 0,
        }
    }

    /// `true` for character data the data source stores with a single byte character type.
    pub fn is_narrow_text(&self) -> bool {
        matches!(
            self,
            DataType::Char { .. } | DataType::Varchar { .. } | DataType::LongVarchar { .. }
        )
    }

    /// `true` for character data the data source stores as UTF-16.
    pub fn is_wide_text(&self) -> bool {
        matches!(
            self,
            DataType::WChar { .. } | DataType::WVarchar { .. } | DataType::WLongVarchar { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use odbc_sys::SqlDataType;

    use super::DataType;

    #[test]
    fn wide_text_column() {
        let data_type = DataType::new(SqlDataType::EXT_W_VARCHAR, 50, 0);
        assert_eq!(DataType::WVarchar { length: 50 }, data_type);
        assert!(data_type.is_wide_text());
        assert!(!data_type.is_narrow_text());
        assert_eq!(50, data_type.column_size());
    }

    #[test]
    fn long_varchar_reports_size_zero() {
        let data_type = DataType::new(SqlDataType::EXT_LONG_VARCHAR, 0, 0);
        assert!(data_type.is_narrow_text());
        assert_eq!(0, data_type.column_size());
    }

    #[test]
    fn integers_are_not_text() {
        let data_type = DataType::new(SqlDataType::EXT_BIG_INT, 19, 0);
        assert_eq!(DataType::BigInt, data_type);
        assert!(!data_type.is_narrow_text());
        assert!(!data_type.is_wide_text());
    }
}
