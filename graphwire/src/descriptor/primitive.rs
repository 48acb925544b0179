//! Field serializers for the leaf value types (spec §4.2 items 1-3): bools,
//! the signed/unsigned integer widths, and the two float widths. All share
//! one zero-sized marker, [`Primitive`], implementing [`FieldSerializer<T>`]
//! once per concrete `T` — distinct, non-overlapping impls of the same
//! generic trait, not one blanket impl.

use super::FieldSerializer;
use crate::atom::Atom;
use crate::codec::{IArchive, OArchive};
use crate::error::{ReadError, WriteError};

/// Marker serializer for every leaf numeric/bool type. Holds no state: the
/// wire representation is fully determined by `T` and the atom it maps to.
pub struct Primitive;

impl FieldSerializer<bool> for Primitive {
	fn atom(&self) -> Atom {
		Atom::Bool
	}

	fn size(&self, _archive: &mut dyn OArchive, _value: &bool) -> Result<u64, WriteError> {
		Ok(1)
	}

	fn write(&self, archive: &mut dyn OArchive, value: &bool) -> Result<(), WriteError> {
		archive.write_bool(*value)
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut bool, _byte_budget: u64) -> Result<(), ReadError> {
		*value = archive.read_bool()?;
		Ok(())
	}
}

impl FieldSerializer<f32> for Primitive {
	fn atom(&self) -> Atom {
		Atom::F32
	}

	fn size(&self, _archive: &mut dyn OArchive, _value: &f32) -> Result<u64, WriteError> {
		Ok(4)
	}

	fn write(&self, archive: &mut dyn OArchive, value: &f32) -> Result<(), WriteError> {
		archive.write_f32(*value)
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut f32, _byte_budget: u64) -> Result<(), ReadError> {
		*value = archive.read_f32()?;
		Ok(())
	}
}

impl FieldSerializer<f64> for Primitive {
	fn atom(&self) -> Atom {
		Atom::F64
	}

	fn size(&self, _archive: &mut dyn OArchive, _value: &f64) -> Result<u64, WriteError> {
		Ok(8)
	}

	fn write(&self, archive: &mut dyn OArchive, value: &f64) -> Result<(), WriteError> {
		archive.write_f64(*value)
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut f64, _byte_budget: u64) -> Result<(), ReadError> {
		*value = archive.read_f64()?;
		Ok(())
	}
}

/// Implements `FieldSerializer<$ty>` for `Primitive`. `$ty` round-trips
/// through `i64` as a bit-pattern reinterpretation (`as` between integer
/// types of equal or lesser width never changes the underlying bits), so a
/// `u32` field and an `i32` field both go through `write_integer`/
/// `read_integer` identically (spec: the atom, not the Rust type, determines
/// the wire shape). `write_fixed`/`read_fixed` instead emit the raw
/// little-endian bytes used by array elements in fixed mode (spec §4.5.1, §8
/// scenario 6).
macro_rules! impl_integer {
	($ty:ty, $atom:ident, $width:literal) => {
		impl FieldSerializer<$ty> for Primitive {
			fn atom(&self) -> Atom {
				Atom::$atom
			}

			fn size(&self, archive: &mut dyn OArchive, value: &$ty) -> Result<u64, WriteError> {
				Ok(archive.size_integer(*value as i64, Atom::$atom))
			}

			fn write(&self, archive: &mut dyn OArchive, value: &$ty) -> Result<(), WriteError> {
				archive.write_integer(*value as i64, Atom::$atom)
			}

			fn read(&self, archive: &mut dyn IArchive, value: &mut $ty, _byte_budget: u64) -> Result<(), ReadError> {
				*value = archive.read_integer(Atom::$atom)? as $ty;
				Ok(())
			}

			fn write_fixed(&self, archive: &mut dyn OArchive, value: &$ty) -> Result<(), WriteError> {
				archive.write_bytes(&(*value).to_le_bytes())
			}

			fn read_fixed(&self, archive: &mut dyn IArchive, value: &mut $ty) -> Result<(), ReadError> {
				let mut buf = [0u8; $width];
				archive.read_bytes(&mut buf)?;
				*value = <$ty>::from_le_bytes(buf);
				Ok(())
			}
		}
	};
}

impl_integer!(i8, I8, 1);
impl_integer!(i16, I16, 2);
impl_integer!(i32, I32, 4);
impl_integer!(i64, I64, 8);
impl_integer!(u8, I8, 1);
impl_integer!(u16, I16, 2);
impl_integer!(u32, I32, 4);
impl_integer!(u64, I64, 8);

/// Maps a fieldless, `#[repr(i32)]`-style enum onto [`Atom::I32`] (spec
/// `SPEC_FULL.md` §12: the original treats `enum class` as a transparent
/// `int32`). `to_i32`/`from_i32` are typically `as i32` and a small `match`.
pub struct EnumAsI32<C> {
	to_i32: fn(&C) -> i32,
	from_i32: fn(i32) -> C,
}

impl<C> EnumAsI32<C> {
	pub fn new(to_i32: fn(&C) -> i32, from_i32: fn(i32) -> C) -> Self {
		Self { to_i32, from_i32 }
	}
}

impl<C> FieldSerializer<C> for EnumAsI32<C> {
	fn atom(&self) -> Atom {
		Atom::I32
	}

	fn size(&self, archive: &mut dyn OArchive, value: &C) -> Result<u64, WriteError> {
		Ok(archive.size_integer((self.to_i32)(value) as i64, Atom::I32))
	}

	fn write(&self, archive: &mut dyn OArchive, value: &C) -> Result<(), WriteError> {
		archive.write_integer((self.to_i32)(value) as i64, Atom::I32)
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut C, _byte_budget: u64) -> Result<(), ReadError> {
		let raw = archive.read_integer(Atom::I32)? as i32;
		*value = (self.from_i32)(raw);
		Ok(())
	}

	fn write_fixed(&self, archive: &mut dyn OArchive, value: &C) -> Result<(), WriteError> {
		archive.write_bytes(&(self.to_i32)(value).to_le_bytes())
	}

	fn read_fixed(&self, archive: &mut dyn IArchive, value: &mut C) -> Result<(), ReadError> {
		let mut buf = [0u8; 4];
		archive.read_bytes(&mut buf)?;
		*value = (self.from_i32)(i32::from_le_bytes(buf));
		Ok(())
	}
}
