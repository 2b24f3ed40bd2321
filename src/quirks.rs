/// A (non exhaustive) description of the non ODBC API conformant behavior of ODBC drivers, as far
/// as it concerns binding result columns.
///
/// Workarounds which are intended to help application developers seperate between the descision of
/// how to deal with non conformity from the knowledge which driver behaves weird in exactly which
/// way. See [`crate::IntoOptions::from_quirks`] for the descision part.
#[non_exhaustive]
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Quirks {
    /// There are plenty of issues in the net about the Oracle ODBC driver not supporting 64 Bit
    /// integers. Binding a column as `SQL_C_SBIGINT` or `SQL_C_UBIGINT` fails with a rather
    /// cryptic `[Oracle][ODBC]Invalid SQL data type <-25>`.
    pub no_native_64_bit_integers: bool,
}

impl Quirks {
    /// A new instance describing an ODBC driver without quirks
    pub fn new() -> Self {
        Quirks {
            no_native_64_bit_integers: false,
        }
    }

    /// Fill quirks based on the name of the database management system, as reported by
    /// `SQLGetInfo` with `SQL_DBMS_NAME`.
    ///
    /// ```
    /// use odbc_into::Quirks;
    ///
    /// let quirks = Quirks::from_dbms_name("Oracle");
    /// assert!(quirks.no_native_64_bit_integers);
    ///
    /// let quirks = Quirks::from_dbms_name("Microsoft SQL Server");
    /// assert!(!quirks.no_native_64_bit_integers);
    /// ```
    pub fn from_dbms_name(name: &str) -> Self {
        let mut quirks = Quirks::new();

        if name.starts_with("Oracle") {
            quirks.no_native_64_bit_integers = true
        }

        quirks
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Self::new()
    }
}
