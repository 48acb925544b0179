//! Typed field adapters that erase down to [`CompositeField<C>`] (spec's
//! "pointer-to-member", resolved as projection closures per Design Note 1 —
//! see `SPEC_FULL.md` §13).

use super::{CompositeField, Describe, Descriptor, FieldSerializer};
use crate::atom::Atom;
use crate::codec::{IArchive, OArchive};
use crate::error::{ReadError, WriteError};

/// An ordinary field of composite `C`: a typed value of type `T` reached via
/// a pair of projection closures, serialized through `S`. `identifier == 0`
/// marks a positional field (spec §4.2/§4.3); any other value is an
/// identified field's tag.
pub struct Field<C, T, S: FieldSerializer<T>> {
	identifier: u32,
	name: Option<&'static str>,
	get: fn(&C) -> &T,
	get_mut: fn(&mut C) -> &mut T,
	serializer: S,
}

impl<C, T, S: FieldSerializer<T>> Field<C, T, S> {
	pub fn positional(name: &'static str, get: fn(&C) -> &T, get_mut: fn(&mut C) -> &mut T, serializer: S) -> Self {
		Self { identifier: 0, name: Some(name), get, get_mut, serializer }
	}

	pub fn identified(
		identifier: u32,
		name: &'static str,
		get: fn(&C) -> &T,
		get_mut: fn(&mut C) -> &mut T,
		serializer: S,
	) -> Self {
		assert_ne!(identifier, 0, "identified field `{name}` must not reuse the reserved identifier 0");
		Self { identifier, name: Some(name), get, get_mut, serializer }
	}
}

impl<C, T, S: FieldSerializer<T>> CompositeField<C> for Field<C, T, S> {
	fn identifier(&self) -> u32 {
		self.identifier
	}

	fn name(&self) -> Option<&'static str> {
		self.name
	}

	fn atom(&self) -> Atom {
		self.serializer.atom()
	}

	fn allocates(&self) -> bool {
		self.serializer.allocates()
	}

	fn is_optional(&self) -> bool {
		self.serializer.is_optional()
	}

	fn size(&self, archive: &mut dyn OArchive, obj: &C) -> Result<u64, WriteError> {
		self.serializer.size(archive, (self.get)(obj))
	}

	fn write(&self, archive: &mut dyn OArchive, obj: &C) -> Result<(), WriteError> {
		self.serializer.write(archive, (self.get)(obj))
	}

	fn read(&self, archive: &mut dyn IArchive, obj: &mut C, byte_budget: u64) -> Result<(), ReadError> {
		self.serializer.read(archive, (self.get_mut)(obj), byte_budget)
	}
}

/// A field reached through a getter/setter pair rather than a direct
/// reference projection (spec §4.2 item 12) — for properties computed from
/// other state, or that enforce an invariant on assignment. `T` is read into
/// a `Default` scratch value, then installed via `set`.
pub struct GetterSetterField<C, T: Default, S: FieldSerializer<T>> {
	identifier: u32,
	name: Option<&'static str>,
	get: fn(&C) -> T,
	set: fn(&mut C, T),
	serializer: S,
}

impl<C, T: Default, S: FieldSerializer<T>> GetterSetterField<C, T, S> {
	pub fn identified(identifier: u32, name: &'static str, get: fn(&C) -> T, set: fn(&mut C, T), serializer: S) -> Self {
		assert_ne!(identifier, 0, "identified field `{name}` must not reuse the reserved identifier 0");
		Self { identifier, name: Some(name), get, set, serializer }
	}
}

impl<C, T: Default, S: FieldSerializer<T>> CompositeField<C> for GetterSetterField<C, T, S> {
	fn identifier(&self) -> u32 {
		self.identifier
	}

	fn name(&self) -> Option<&'static str> {
		self.name
	}

	fn atom(&self) -> Atom {
		self.serializer.atom()
	}

	fn allocates(&self) -> bool {
		self.serializer.allocates()
	}

	fn is_optional(&self) -> bool {
		self.serializer.is_optional()
	}

	fn size(&self, archive: &mut dyn OArchive, obj: &C) -> Result<u64, WriteError> {
		let value = (self.get)(obj);
		self.serializer.size(archive, &value)
	}

	fn write(&self, archive: &mut dyn OArchive, obj: &C) -> Result<(), WriteError> {
		let value = (self.get)(obj);
		self.serializer.write(archive, &value)
	}

	fn read(&self, archive: &mut dyn IArchive, obj: &mut C, byte_budget: u64) -> Result<(), ReadError> {
		let mut scratch = T::default();
		self.serializer.read(archive, &mut scratch, byte_budget)?;
		(self.set)(obj, scratch);
		Ok(())
	}
}

/// A base-class field (spec §4.2 item 14): Rust has no base classes, so this
/// is just a positional [`Field`] whose serializer is another type's own
/// [`Descriptor`], embedding `B`'s fields into `C`'s wire layout at
/// identifier 0.
pub fn base_field<C, B: Describe>(get: fn(&C) -> &B, get_mut: fn(&mut C) -> &mut B) -> Field<C, B, Descriptor<B>> {
	Field::positional("<base>", get, get_mut, B::describe())
}

/// Re-exported for symmetry with [`Field`]/[`GetterSetterField`]; see
/// [`base_field`] for the constructor (a type alias keeps the `descriptor`
/// module's re-export list simple).
pub type BaseField<C, B> = Field<C, B, Descriptor<B>>;
