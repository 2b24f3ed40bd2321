use crate::target::RowId;
use odbc_sys::{CDataType, Len};
use std::{ffi::c_void, mem::size_of};

/// A plain old data type with an associated C Type. Must be completely stack allocated without any
/// external references. Variables of these types are bound directly to their column, so the driver
/// writes the fetched values straight into them.
///
/// # Safety
///
/// A type implementing this trait, must be a fixed sized type. The information in the
/// `C_DATA_TYPE` constant must be enough to determine both the size and the buffer length of an
/// Instance.
pub unsafe trait Pod: Copy + 'static {
    /// ODBC C Data type used to bind instances to a statement.
    const C_DATA_TYPE: CDataType;

    /// Pointer to the value, suitable to be passed to `SQLBindCol`.
    fn mut_value_ptr(&mut self) -> *mut c_void {
        self as *mut Self as *mut c_void
    }

    /// Size of the value in bytes.
    fn buffer_length() -> Len {
        size_of::<Self>() as Len
    }
}

macro_rules! impl_pod {
    ($t:ident, $c_data_type:expr) => {
        unsafe impl Pod for $t {
            const C_DATA_TYPE: CDataType = $c_data_type;
        }
    };
}

impl_pod!(f64, CDataType::Double);
impl_pod!(i8, CDataType::STinyInt);
impl_pod!(u8, CDataType::UTinyInt);
impl_pod!(i16, CDataType::SShort);
impl_pod!(u16, CDataType::UShort);
impl_pod!(i32, CDataType::SLong);
impl_pod!(u32, CDataType::ULong);
impl_pod!(i64, CDataType::SBigInt);
impl_pod!(u64, CDataType::UBigInt);
// `RowId` is `repr(transparent)` over `u32`.
impl_pod!(RowId, CDataType::ULong);
