//! The descriptor model: a runtime plan of fields for one composite type
//! (spec §3, §4.2, §4.3). `Descriptor<C>` is itself a
//! [`FieldSerializer<C>`], so composites nest without any special-casing —
//! a base-class field is just an ordinary positional field whose serializer
//! happens to be another `Descriptor`.

pub mod container;
pub mod field;
pub mod pointer;
pub mod primitive;

pub use field::{BaseField, Field, GetterSetterField};

use crate::atom::Atom;
use crate::codec::{IArchive, OArchive};
use crate::error::{ReadError, WriteError};

/// The capability set for any serializable unit (spec §3 "Field
/// serializer"). Parameterized on the value type so primitive impls
/// (`bool`, `i32`, ...) and container/pointer impls can all exist as
/// distinct, non-overlapping `impl`s, while still being object-safe for a
/// *fixed* `T` — which is all [`field::Field`] needs to box one per field.
pub trait FieldSerializer<T: ?Sized> {
	fn atom(&self) -> Atom;
	/// Whether reading this field can allocate heap storage (spec: "any
	/// field that owns heap"). Propagates transitively through containers.
	fn allocates(&self) -> bool {
		false
	}
	fn is_optional(&self) -> bool {
		false
	}
	fn size(&self, archive: &mut dyn OArchive, value: &T) -> Result<u64, WriteError>;
	fn write(&self, archive: &mut dyn OArchive, value: &T) -> Result<(), WriteError>;
	fn read(&self, archive: &mut dyn IArchive, value: &mut T, byte_budget: u64) -> Result<(), ReadError>;

	/// Writes `value` in the fixed-width array-element representation (spec
	/// §4.5.1, §8 scenario 6). Only called when
	/// [`Atom::fixed_width`] is `Some` for this atom; the default simply
	/// forwards to [`write`](Self::write), which is only correct for atoms
	/// whose standalone and fixed-array encodings coincide (`bool`).
	fn write_fixed(&self, archive: &mut dyn OArchive, value: &T) -> Result<(), WriteError> {
		self.write(archive, value)
	}
	fn read_fixed(&self, archive: &mut dyn IArchive, value: &mut T) -> Result<(), ReadError> {
		self.read(archive, value, 0)
	}
}

/// Object-safe, per-composite-type erasure of one field: the `T` in
/// `FieldSerializer<T>` is hidden, leaving only operations keyed on the
/// owning composite `C`. A [`Descriptor<C>`] holds a `Vec<Box<dyn
/// CompositeField<C>>>` of these.
pub trait CompositeField<C> {
	fn identifier(&self) -> u32;
	fn name(&self) -> Option<&'static str>;
	fn atom(&self) -> Atom;
	fn allocates(&self) -> bool;
	fn is_optional(&self) -> bool;
	fn size(&self, archive: &mut dyn OArchive, obj: &C) -> Result<u64, WriteError>;
	fn write(&self, archive: &mut dyn OArchive, obj: &C) -> Result<(), WriteError>;
	fn read(&self, archive: &mut dyn IArchive, obj: &mut C, byte_budget: u64) -> Result<(), ReadError>;
}

/// Implemented by any type with a static [`Descriptor`]. Produced by
/// `#[derive(Describe)]` (see the `graphwire-derive` crate) or written by
/// hand for leaf/container adapters.
pub trait Describe: Sized {
	fn describe() -> Descriptor<Self>;
}

/// A runtime plan of fields for one composite type `C` (spec §3, §4.3).
pub struct Descriptor<C> {
	name: Option<&'static str>,
	positional: Vec<Box<dyn CompositeField<C>>>,
	/// Kept sorted by identifier, enabling binary search on read and a
	/// stable ascending-id emission order on write (spec §4.5.4: "MAY
	/// stabilize by ascending id").
	identified: Vec<Box<dyn CompositeField<C>>>,
	post_read_hooks: Vec<fn(&mut C)>,
	allocates: bool,
}

impl<C> Descriptor<C> {
	pub fn name(&self) -> Option<&'static str> {
		self.name
	}

	pub fn has_positional(&self) -> bool {
		!self.positional.is_empty()
	}

	pub fn positional(&self) -> &[Box<dyn CompositeField<C>>] {
		&self.positional
	}

	pub fn identified(&self) -> &[Box<dyn CompositeField<C>>] {
		&self.identified
	}

	pub fn find_identified(&self, identifier: u32) -> Option<&dyn CompositeField<C>> {
		self.identified
			.binary_search_by_key(&identifier, |f| f.identifier())
			.ok()
			.map(|i| self.identified[i].as_ref())
	}
}

impl<C> FieldSerializer<C> for Descriptor<C> {
	fn atom(&self) -> Atom {
		if self.identified.is_empty() {
			Atom::FinalizedDescriptor
		} else {
			Atom::Descriptor
		}
	}

	fn allocates(&self) -> bool {
		self.allocates
	}

	fn size(&self, archive: &mut dyn OArchive, obj: &C) -> Result<u64, WriteError> {
		let mut total = 0u64;
		for field in &self.positional {
			let payload = field.size(archive, obj)?;
			if field.atom().wire_kind() == crate::atom::WireKind::LenDelimited {
				total += archive.size_length_prefix(payload);
			}
			total += payload;
		}
		for field in &self.identified {
			total += archive.size_identified_tag(field.identifier(), field.atom());
			let payload = field.size(archive, obj)?;
			if field.atom().wire_kind() == crate::atom::WireKind::LenDelimited {
				total += archive.size_length_prefix(payload);
			}
			total += payload;
		}
		Ok(total)
	}

	fn write(&self, archive: &mut dyn OArchive, obj: &C) -> Result<(), WriteError> {
		archive.begin_descriptor(self.name.unwrap_or("<anonymous>"), self.has_positional())?;
		for field in &self.positional {
			if field.atom().wire_kind() == crate::atom::WireKind::LenDelimited {
				let payload = field.size(archive, obj)?;
				archive.write_length_prefix(payload)?;
			}
			field.write(archive, obj)?;
		}
		for field in &self.identified {
			archive.write_identified_tag(field.identifier(), field.atom())?;
			if field.atom().wire_kind() == crate::atom::WireKind::LenDelimited {
				let payload = field.size(archive, obj)?;
				archive.write_length_prefix(payload)?;
			}
			field.write(archive, obj)?;
		}
		Ok(())
	}

	fn read(&self, archive: &mut dyn IArchive, obj: &mut C, byte_budget: u64) -> Result<(), ReadError> {
		// Positional fields need no tag dispatch, so they're read directly,
		// before handing control to the archive's identified-field loop —
		// this also means only one closure below ever needs to borrow `obj`.
		let limit = archive.count() + byte_budget;
		for field in &self.positional {
			let field_budget = if field.atom().wire_kind() == crate::atom::WireKind::LenDelimited {
				archive.read_length_prefix()?
			} else {
				0
			};
			field.read(archive, obj, field_budget)?;
		}
		if archive.count() > limit {
			return Err(ReadError::framing_mismatch(archive.count(), byte_budget));
		}
		let remaining = limit - archive.count();
		archive.read_descriptor(remaining, &mut |identifier| {
			self.find_identified(identifier).map(|field| {
				// Fresh reborrow per call: this closure is `FnMut`, invoked
				// once per identified tag in the stream, and each
				// invocation needs its own short-lived `&mut C` to hand to
				// a freshly built `move` closure.
				let obj: &mut C = &mut *obj;
				let run: Box<dyn FnOnce(&mut dyn IArchive, u64) -> Result<(), ReadError>> =
					Box::new(move |archive, budget| field.read(archive, obj, budget));
				(field.atom().wire_kind(), run)
			})
		})?;
		for hook in &self.post_read_hooks {
			hook(obj);
		}
		Ok(())
	}
}

/// Incrementally builds a [`Descriptor<C>`], asserting the spec's
/// uniqueness-of-identifier invariant at `build()` time.
pub struct DescriptorBuilder<C> {
	name: Option<&'static str>,
	positional: Vec<Box<dyn CompositeField<C>>>,
	identified: Vec<Box<dyn CompositeField<C>>>,
	post_read_hooks: Vec<fn(&mut C)>,
}

impl<C> Default for DescriptorBuilder<C> {
	fn default() -> Self {
		Self { name: None, positional: Vec::new(), identified: Vec::new(), post_read_hooks: Vec::new() }
	}
}

impl<C> DescriptorBuilder<C> {
	pub fn new(name: &'static str) -> Self {
		Self { name: Some(name), ..Self::default() }
	}

	pub fn positional(mut self, field: Box<dyn CompositeField<C>>) -> Self {
		assert_eq!(field.identifier(), 0, "positional fields must carry identifier 0");
		self.positional.push(field);
		self
	}

	pub fn identified(mut self, field: Box<dyn CompositeField<C>>) -> Self {
		assert_ne!(field.identifier(), 0, "identified fields must carry a non-zero identifier");
		self.identified.push(field);
		self
	}

	pub fn post_read_hook(mut self, hook: fn(&mut C)) -> Self {
		self.post_read_hooks.push(hook);
		self
	}

	pub fn build(mut self) -> Descriptor<C> {
		self.identified.sort_by_key(|f| f.identifier());
		for window in self.identified.windows(2) {
			assert_ne!(
				window[0].identifier(),
				window[1].identifier(),
				"duplicate field identifier {} in descriptor `{}`",
				window[1].identifier(),
				self.name.unwrap_or("<anonymous>")
			);
		}
		let allocates = self.positional.iter().chain(self.identified.iter()).any(|f| f.allocates());
		Descriptor {
			name: self.name,
			positional: self.positional,
			identified: self.identified,
			post_read_hooks: self.post_read_hooks,
			allocates,
		}
	}
}
