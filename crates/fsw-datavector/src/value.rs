use fsw_errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// The closed set of scalar types a Data Vector element may hold.
///
/// Redesign flag: the original source dispatches per-type behavior through
/// a template/type-id comparison for each of Action, Transition, and DV
/// read/write. Here every one of those call sites funnels through this one
/// sum type instead, so there is exactly one place that maps a discriminant
/// to a byte width and a memcpy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
}

impl ElementType {
    /// The natural width, in bytes, of this type on a little-endian host.
    pub const fn width(self) -> usize {
        match self {
            ElementType::U8 | ElementType::I8 | ElementType::Bool => 1,
            ElementType::U16 | ElementType::I16 => 2,
            ElementType::U32 | ElementType::I32 | ElementType::F32 => 4,
            ElementType::U64 | ElementType::I64 | ElementType::F64 => 8,
        }
    }

    /// Whether `increment` is defined for this type (integers only).
    pub const fn is_integer(self) -> bool {
        !matches!(self, ElementType::F32 | ElementType::F64 | ElementType::Bool)
    }
}

/// A value tagged with one of the eleven element types.
///
/// `TypedValue` is the sole carrier for configured initial values, Action
/// targets, and Transition literals — nothing in this crate passes a type
/// parameter across a boundary it doesn't own; generic `read<T>`/`write<T>`
/// exist only as ergonomic entry points that immediately convert to/from
/// this type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TypedValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
}

impl TypedValue {
    pub const fn element_type(self) -> ElementType {
        match self {
            TypedValue::U8(_) => ElementType::U8,
            TypedValue::U16(_) => ElementType::U16,
            TypedValue::U32(_) => ElementType::U32,
            TypedValue::U64(_) => ElementType::U64,
            TypedValue::I8(_) => ElementType::I8,
            TypedValue::I16(_) => ElementType::I16,
            TypedValue::I32(_) => ElementType::I32,
            TypedValue::I64(_) => ElementType::I64,
            TypedValue::F32(_) => ElementType::F32,
            TypedValue::F64(_) => ElementType::F64,
            TypedValue::Bool(_) => ElementType::Bool,
        }
    }

    /// Serialize to this value's natural little-endian byte width.
    pub fn to_bytes_le(self) -> Vec<u8> {
        match self {
            TypedValue::U8(v) => vec![v],
            TypedValue::U16(v) => v.to_le_bytes().to_vec(),
            TypedValue::U32(v) => v.to_le_bytes().to_vec(),
            TypedValue::U64(v) => v.to_le_bytes().to_vec(),
            TypedValue::I8(v) => vec![v as u8],
            TypedValue::I16(v) => v.to_le_bytes().to_vec(),
            TypedValue::I32(v) => v.to_le_bytes().to_vec(),
            TypedValue::I64(v) => v.to_le_bytes().to_vec(),
            TypedValue::F32(v) => v.to_le_bytes().to_vec(),
            TypedValue::F64(v) => v.to_le_bytes().to_vec(),
            TypedValue::Bool(v) => vec![v as u8],
        }
    }

    /// Parse `bytes` (exactly `ty.width()` long) as `ty`.
    ///
    /// # Panics
    /// Panics if `bytes.len() != ty.width()`; callers only ever slice
    /// exactly that many bytes out of the backing buffer, so a mismatch
    /// here is a bug in this crate, not caller input.
    pub fn from_bytes_le(ty: ElementType, bytes: &[u8]) -> TypedValue {
        assert_eq!(bytes.len(), ty.width());
        match ty {
            ElementType::U8 => TypedValue::U8(bytes[0]),
            ElementType::U16 => TypedValue::U16(u16::from_le_bytes(bytes.try_into().unwrap())),
            ElementType::U32 => TypedValue::U32(u32::from_le_bytes(bytes.try_into().unwrap())),
            ElementType::U64 => TypedValue::U64(u64::from_le_bytes(bytes.try_into().unwrap())),
            ElementType::I8 => TypedValue::I8(bytes[0] as i8),
            ElementType::I16 => TypedValue::I16(i16::from_le_bytes(bytes.try_into().unwrap())),
            ElementType::I32 => TypedValue::I32(i32::from_le_bytes(bytes.try_into().unwrap())),
            ElementType::I64 => TypedValue::I64(i64::from_le_bytes(bytes.try_into().unwrap())),
            ElementType::F32 => TypedValue::F32(f32::from_le_bytes(bytes.try_into().unwrap())),
            ElementType::F64 => TypedValue::F64(f64::from_le_bytes(bytes.try_into().unwrap())),
            ElementType::Bool => TypedValue::Bool(bytes[0] != 0),
        }
    }

    /// Saturating increment by one. Returns `Err(AlreadyMax)` without
    /// mutating when already at the type's maximum; `Err(InvalidType)` for
    /// non-integer types.
    pub fn increment(self) -> Result<TypedValue> {
        macro_rules! step {
            ($v:expr, $max:expr, $ctor:path) => {
                if $v == $max { Err(Error::AlreadyMax) } else { Ok($ctor($v + 1)) }
            };
        }
        match self {
            TypedValue::U8(v) => step!(v, u8::MAX, TypedValue::U8),
            TypedValue::U16(v) => step!(v, u16::MAX, TypedValue::U16),
            TypedValue::U32(v) => step!(v, u32::MAX, TypedValue::U32),
            TypedValue::U64(v) => step!(v, u64::MAX, TypedValue::U64),
            TypedValue::I8(v) => step!(v, i8::MAX, TypedValue::I8),
            TypedValue::I16(v) => step!(v, i16::MAX, TypedValue::I16),
            TypedValue::I32(v) => step!(v, i32::MAX, TypedValue::I32),
            TypedValue::I64(v) => step!(v, i64::MAX, TypedValue::I64),
            TypedValue::F32(_) | TypedValue::F64(_) | TypedValue::Bool(_) => Err(Error::InvalidType),
        }
    }

    /// Narrow a raw command-handler word to `ty`, per the Command Handler's
    /// write-cast rule: integer truncation, float bit-cast via the low
    /// bytes, and `value != 0` for bool.
    pub fn narrow_from_u64(ty: ElementType, raw: u64) -> TypedValue {
        match ty {
            ElementType::U8 => TypedValue::U8(raw as u8),
            ElementType::U16 => TypedValue::U16(raw as u16),
            ElementType::U32 => TypedValue::U32(raw as u32),
            ElementType::U64 => TypedValue::U64(raw),
            ElementType::I8 => TypedValue::I8(raw as i8),
            ElementType::I16 => TypedValue::I16(raw as i16),
            ElementType::I32 => TypedValue::I32(raw as i32),
            ElementType::I64 => TypedValue::I64(raw as i64),
            ElementType::F32 => TypedValue::F32(f32::from_bits(raw as u32)),
            ElementType::F64 => TypedValue::F64(f64::from_bits(raw)),
            ElementType::Bool => TypedValue::Bool(raw != 0),
        }
    }
}

/// Implemented for the eleven scalar types storable in a Data Vector,
/// giving the generic `read<T>`/`write<T>` entry points a single
/// conversion seam into [`TypedValue`].
pub trait DvScalar: Copy + Sized + 'static {
    const ELEMENT_TYPE: ElementType;

    fn into_typed(self) -> TypedValue;
    fn from_typed(value: TypedValue) -> Result<Self>;
}

macro_rules! impl_dv_scalar {
    ($rust_ty:ty, $variant:ident, $elem_ty:expr) => {
        impl DvScalar for $rust_ty {
            const ELEMENT_TYPE: ElementType = $elem_ty;

            fn into_typed(self) -> TypedValue {
                TypedValue::$variant(self)
            }

            fn from_typed(value: TypedValue) -> Result<Self> {
                match value {
                    TypedValue::$variant(v) => Ok(v),
                    _ => Err(Error::IncorrectType),
                }
            }
        }
    };
}

impl_dv_scalar!(u8, U8, ElementType::U8);
impl_dv_scalar!(u16, U16, ElementType::U16);
impl_dv_scalar!(u32, U32, ElementType::U32);
impl_dv_scalar!(u64, U64, ElementType::U64);
impl_dv_scalar!(i8, I8, ElementType::I8);
impl_dv_scalar!(i16, I16, ElementType::I16);
impl_dv_scalar!(i32, I32, ElementType::I32);
impl_dv_scalar!(i64, I64, ElementType::I64);
impl_dv_scalar!(f32, F32, ElementType::F32);
impl_dv_scalar!(f64, F64, ElementType::F64);
impl_dv_scalar!(bool, Bool, ElementType::Bool);

impl std::fmt::Display for TypedValue {
    /// Formats the way the original logger's `std::to_string` conversions
    /// did per type: integers plain, floats/doubles to six decimal places
    /// (`inf`/`-inf` for infinities), bool as `0`/`1`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            TypedValue::U8(v) => write!(f, "{v}"),
            TypedValue::U16(v) => write!(f, "{v}"),
            TypedValue::U32(v) => write!(f, "{v}"),
            TypedValue::U64(v) => write!(f, "{v}"),
            TypedValue::I8(v) => write!(f, "{v}"),
            TypedValue::I16(v) => write!(f, "{v}"),
            TypedValue::I32(v) => write!(f, "{v}"),
            TypedValue::I64(v) => write!(f, "{v}"),
            TypedValue::F32(v) => write!(f, "{v:.6}"),
            TypedValue::F64(v) => write!(f, "{v:.6}"),
            TypedValue::Bool(v) => write!(f, "{}", v as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        for tv in [
            TypedValue::U16(10),
            TypedValue::F32(1.5),
            TypedValue::Bool(true),
            TypedValue::I64(-7),
        ] {
            let bytes = tv.to_bytes_le();
            assert_eq!(TypedValue::from_bytes_le(tv.element_type(), &bytes), tv);
        }
    }

    #[test]
    fn increment_saturates_at_max() {
        assert_eq!(TypedValue::U8(u8::MAX).increment(), Err(Error::AlreadyMax));
        assert_eq!(TypedValue::U8(1).increment(), Ok(TypedValue::U8(2)));
    }

    #[test]
    fn increment_rejects_non_integers() {
        assert_eq!(TypedValue::F32(1.0).increment(), Err(Error::InvalidType));
        assert_eq!(TypedValue::Bool(false).increment(), Err(Error::InvalidType));
    }

    #[test]
    fn narrow_truncates_low_byte() {
        assert_eq!(TypedValue::narrow_from_u64(ElementType::U8, 0x1FF), TypedValue::U8(0xFF));
        assert_eq!(TypedValue::narrow_from_u64(ElementType::Bool, 0), TypedValue::Bool(false));
        assert_eq!(TypedValue::narrow_from_u64(ElementType::Bool, 42), TypedValue::Bool(true));
    }

    #[test]
    fn display_matches_logger_expectations() {
        assert_eq!(TypedValue::U8(255).to_string(), "255");
        assert_eq!(TypedValue::I64(i64::MIN).to_string(), "-9223372036854775808");
        assert_eq!(TypedValue::F32(1.2345678).to_string(), "1.234568");
        assert_eq!(TypedValue::F64(f64::INFINITY).to_string(), "inf");
        assert_eq!(TypedValue::F64(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(TypedValue::Bool(true).to_string(), "1");
        assert_eq!(TypedValue::Bool(false).to_string(), "0");
    }
}
