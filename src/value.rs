//! Decoded tag values and the TIFF primitive type codes.

use std::fmt;

use bytes::Bytes;
use num_enum::TryFromPrimitive;

use crate::error::{IfdexError, IfdexResult};

/// TIFF 6.0 field types, plus the `IFD` type from TIFF Supplement 1.
///
/// Entries carrying a type code outside this enum are skipped with a per-tag
/// decode error; they never abort a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u16)]
pub enum Type {
    /// 8-bit unsigned integer.
    Byte = 1,
    /// 8-bit bytes holding 7-bit ASCII, NUL-terminated.
    Ascii = 2,
    /// 16-bit unsigned integer.
    Short = 3,
    /// 32-bit unsigned integer.
    Long = 4,
    /// Pair of 32-bit unsigned integers (numerator, denominator).
    Rational = 5,
    /// 8-bit signed integer.
    SByte = 6,
    /// Opaque 8-bit bytes.
    Undefined = 7,
    /// 16-bit signed integer.
    SShort = 8,
    /// 32-bit signed integer.
    SLong = 9,
    /// Pair of 32-bit signed integers (numerator, denominator).
    SRational = 10,
    /// 32-bit IEEE 754 float.
    Float = 11,
    /// 64-bit IEEE 754 float.
    Double = 12,
    /// 32-bit offset of a sub-IFD.
    Ifd = 13,
}

impl Type {
    /// Width of a single component of this type, in bytes.
    pub fn size(self) -> u64 {
        match self {
            Type::Byte | Type::Ascii | Type::SByte | Type::Undefined => 1,
            Type::Short | Type::SShort => 2,
            Type::Long | Type::SLong | Type::Float | Type::Ifd => 4,
            Type::Rational | Type::SRational | Type::Double => 8,
        }
    }
}

/// An unsigned rational number: a pair of 32-bit unsigned integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    /// Numerator.
    pub num: u32,
    /// Denominator.
    pub denom: u32,
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.denom)
    }
}

/// A signed rational number: a pair of 32-bit signed integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SRational {
    /// Numerator.
    pub num: i32,
    /// Denominator.
    pub denom: i32,
}

impl fmt::Display for SRational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.denom)
    }
}

/// A decoded tag value.
///
/// This is a closed tagged union over the scalar shapes a TIFF entry can
/// carry, with `List` for multi-component entries. Coercions between the
/// shapes follow a fixed table rather than per-call-site checks:
///
/// - a single-element `List` coerces exactly like its element;
/// - `Ascii` coerces to a numeric getter when the whole string parses;
/// - integer widths widen losslessly, and sign conversions succeed when the
///   value fits the target;
/// - rationals coerce to `f64` whenever the denominator is non-zero, and to
///   integers only when the division is exact;
/// - everything else is a [`TypeMismatch`](IfdexError::TypeMismatch).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 8-bit unsigned integer.
    Byte(u8),
    /// 8-bit signed integer.
    SByte(i8),
    /// 16-bit unsigned integer.
    Short(u16),
    /// 16-bit signed integer.
    SShort(i16),
    /// 32-bit unsigned integer.
    Long(u32),
    /// 32-bit signed integer.
    SLong(i32),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Unsigned rational.
    Rational(Rational),
    /// Signed rational.
    SRational(SRational),
    /// ASCII string, cut at the first NUL.
    Ascii(String),
    /// Opaque byte run.
    Undefined(Bytes),
    /// Multi-component value.
    List(Vec<Value>),
}

impl Value {
    /// Collapse a single-element list to its element.
    fn scalar(&self) -> &Value {
        match self {
            Value::List(v) if v.len() == 1 => &v[0],
            other => other,
        }
    }

    fn mismatch(&self, requested: &'static str) -> IfdexError {
        IfdexError::TypeMismatch {
            requested,
            actual: self.describe(),
        }
    }

    /// Short description of the stored shape, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Byte(v) => format!("byte {v}"),
            Value::SByte(v) => format!("signed byte {v}"),
            Value::Short(v) => format!("short {v}"),
            Value::SShort(v) => format!("signed short {v}"),
            Value::Long(v) => format!("long {v}"),
            Value::SLong(v) => format!("signed long {v}"),
            Value::Float(v) => format!("float {v}"),
            Value::Double(v) => format!("double {v}"),
            Value::Rational(v) => format!("rational {v}"),
            Value::SRational(v) => format!("signed rational {v}"),
            Value::Ascii(v) => format!("string {v:?}"),
            Value::Undefined(v) => format!("{} undefined bytes", v.len()),
            Value::List(v) => format!("array of {} values", v.len()),
        }
    }

    /// Coerce to an unsigned 32-bit integer.
    pub fn as_uint(&self) -> IfdexResult<u32> {
        match self.scalar() {
            Value::Byte(v) => Ok(u32::from(*v)),
            Value::Short(v) => Ok(u32::from(*v)),
            Value::Long(v) => Ok(*v),
            Value::SByte(v) if *v >= 0 => Ok(*v as u32),
            Value::SShort(v) if *v >= 0 => Ok(*v as u32),
            Value::SLong(v) if *v >= 0 => Ok(*v as u32),
            Value::Rational(r) if r.denom != 0 && r.num % r.denom == 0 => Ok(r.num / r.denom),
            Value::Ascii(s) => s.trim().parse().map_err(|_| self.mismatch("unsigned int")),
            _ => Err(self.mismatch("unsigned int")),
        }
    }

    /// Coerce to a signed 32-bit integer.
    pub fn as_int(&self) -> IfdexResult<i32> {
        match self.scalar() {
            Value::Byte(v) => Ok(i32::from(*v)),
            Value::SByte(v) => Ok(i32::from(*v)),
            Value::Short(v) => Ok(i32::from(*v)),
            Value::SShort(v) => Ok(i32::from(*v)),
            Value::SLong(v) => Ok(*v),
            Value::Long(v) => i32::try_from(*v).map_err(|_| self.mismatch("int")),
            Value::SRational(r) if r.denom != 0 && r.num % r.denom == 0 => Ok(r.num / r.denom),
            Value::Ascii(s) => s.trim().parse().map_err(|_| self.mismatch("int")),
            _ => Err(self.mismatch("int")),
        }
    }

    /// Coerce to a 64-bit float.
    pub fn as_f64(&self) -> IfdexResult<f64> {
        match self.scalar() {
            Value::Byte(v) => Ok(f64::from(*v)),
            Value::SByte(v) => Ok(f64::from(*v)),
            Value::Short(v) => Ok(f64::from(*v)),
            Value::SShort(v) => Ok(f64::from(*v)),
            Value::Long(v) => Ok(f64::from(*v)),
            Value::SLong(v) => Ok(f64::from(*v)),
            Value::Float(v) => Ok(f64::from(*v)),
            Value::Double(v) => Ok(*v),
            Value::Rational(r) if r.denom != 0 => Ok(f64::from(r.num) / f64::from(r.denom)),
            Value::SRational(r) if r.denom != 0 => Ok(f64::from(r.num) / f64::from(r.denom)),
            Value::Ascii(s) => s.trim().parse().map_err(|_| self.mismatch("float")),
            _ => Err(self.mismatch("float")),
        }
    }

    /// Coerce to a string. Only `Ascii` values (or a single-element list of
    /// one) qualify; use [`Value`]'s `Display` for a generic rendering.
    pub fn as_str(&self) -> IfdexResult<&str> {
        match self.scalar() {
            Value::Ascii(s) => Ok(s),
            _ => Err(self.mismatch("string")),
        }
    }

    /// Coerce to an unsigned rational. Plain integers coerce with an
    /// implicit denominator of 1.
    pub fn as_rational(&self) -> IfdexResult<Rational> {
        match self.scalar() {
            Value::Rational(r) => Ok(*r),
            Value::Byte(v) => Ok(Rational {
                num: u32::from(*v),
                denom: 1,
            }),
            Value::Short(v) => Ok(Rational {
                num: u32::from(*v),
                denom: 1,
            }),
            Value::Long(v) => Ok(Rational { num: *v, denom: 1 }),
            _ => Err(self.mismatch("rational")),
        }
    }

    /// Coerce to a vector of unsigned integers. A scalar becomes a
    /// one-element vector.
    pub fn as_uint_vec(&self) -> IfdexResult<Vec<u32>> {
        match self {
            Value::List(v) => v.iter().map(Value::as_uint).collect(),
            scalar => Ok(vec![scalar.as_uint()?]),
        }
    }

    /// Coerce to a byte vector (`Undefined` runs, byte arrays, or a single
    /// byte).
    pub fn as_byte_vec(&self) -> IfdexResult<Vec<u8>> {
        match self {
            Value::Undefined(b) => Ok(b.to_vec()),
            Value::Byte(v) => Ok(vec![*v]),
            Value::List(v) => v
                .iter()
                .map(|e| match e {
                    Value::Byte(b) => Ok(*b),
                    other => Err(other.mismatch("byte array")),
                })
                .collect(),
            other => Err(other.mismatch("byte array")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Byte(v) => write!(f, "{v}"),
            Value::SByte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::SShort(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::SLong(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Rational(v) => write!(f, "{v}"),
            Value::SRational(v) => write!(f, "{v}"),
            Value::Ascii(v) => f.write_str(v),
            Value::Undefined(v) => write!(f, "[{} bytes]", v.len()),
            Value::List(v) => {
                for (i, e) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
        }
    }
}
