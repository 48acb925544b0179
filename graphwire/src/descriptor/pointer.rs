//! Field serializers for the two collapsed pointer kinds (`SPEC_FULL.md`
//! §13): `Owning`/`Shared` both serialize `Rc<RefCell<T>>`, differing only in
//! whether the read-side registry permits a second alias; `Raw` serializes
//! `Weak<RefCell<T>>`, the one non-owning view into arena-held storage.
//!
//! Every referenced object's body is allocated now and populated later, off
//! the registry's work queue (spec §4.8) — no Rust pointer kind can promise
//! "populate after construction" without either `unsafe` or interior
//! mutability, so every kind here is `RefCell`-backed.

use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use super::{Describe, Descriptor, FieldSerializer};
use crate::atom::Atom;
use crate::codec::{IArchive, OArchive, ObjectUnit};
use crate::error::{ReadError, WriteError};

fn build_unit<T: Describe + 'static>(descriptor: &Rc<Descriptor<T>>, target: Rc<RefCell<T>>) -> ObjectUnit {
	let size_descriptor = Rc::clone(descriptor);
	let size_target = Rc::clone(&target);
	let write_descriptor = Rc::clone(descriptor);
	ObjectUnit::new(
		move |archive: &mut dyn OArchive| size_descriptor.size(archive, &size_target.borrow()),
		move |archive: &mut dyn OArchive| write_descriptor.write(archive, &target.borrow()),
	)
}

fn write_rc<T: Describe + 'static>(
	descriptor: &Rc<Descriptor<T>>,
	archive: &mut dyn OArchive,
	value: &Rc<RefCell<T>>,
) -> Result<(), WriteError> {
	let addr = Rc::as_ptr(value) as usize;
	archive.write_object_reference(addr, build_unit(descriptor, Rc::clone(value)))
}

fn read_rc<T: Describe + Default + 'static>(
	descriptor: &Rc<Descriptor<T>>,
	archive: &mut dyn IArchive,
	unique: bool,
) -> Result<Rc<RefCell<T>>, ReadError> {
	let populate_descriptor = Rc::clone(descriptor);
	let any = archive.read_object_reference(
		true,
		unique,
		Box::new(|| Rc::new(RefCell::new(T::default())) as Rc<dyn Any>),
		Box::new(move |any, archive, budget| {
			let cell = any
				.downcast::<RefCell<T>>()
				.map_err(|_| ReadError::custom("object id resolved to an unexpected concrete type"))?;
			let mut guard = cell.borrow_mut();
			populate_descriptor.read(archive, &mut guard, budget)
		}),
	)?;
	// `Rc<RefCell<T>>` has no null representation — an owning or shared field
	// reading the null id has no value to produce.
	let any = any.ok_or_else(|| ReadError::custom("owning/shared reference field cannot hold a null id"))?;
	any.downcast::<RefCell<T>>().map_err(|_| ReadError::custom("object id resolved to an unexpected concrete type"))
}

/// Uniquely-owned reference field (spec's owning pointer kind): the
/// read-side registry rejects a second lookup of the same id once this
/// field has claimed it.
pub struct Owning<T: Describe> {
	descriptor: Rc<Descriptor<T>>,
}

impl<T: Describe> Owning<T> {
	pub fn new() -> Self {
		Self { descriptor: Rc::new(T::describe()) }
	}
}

impl<T: Describe> Default for Owning<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Describe + Default + 'static> FieldSerializer<Rc<RefCell<T>>> for Owning<T> {
	fn atom(&self) -> Atom {
		Atom::Reference
	}

	fn allocates(&self) -> bool {
		true
	}

	fn size(&self, _archive: &mut dyn OArchive, _value: &Rc<RefCell<T>>) -> Result<u64, WriteError> {
		Ok(4)
	}

	fn write(&self, archive: &mut dyn OArchive, value: &Rc<RefCell<T>>) -> Result<(), WriteError> {
		write_rc(&self.descriptor, archive, value)
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut Rc<RefCell<T>>, _byte_budget: u64) -> Result<(), ReadError> {
		*value = read_rc(&self.descriptor, archive, true)?;
		Ok(())
	}

	fn write_fixed(&self, archive: &mut dyn OArchive, value: &Rc<RefCell<T>>) -> Result<(), WriteError> {
		self.write(archive, value)
	}

	fn read_fixed(&self, archive: &mut dyn IArchive, value: &mut Rc<RefCell<T>>) -> Result<(), ReadError> {
		self.read(archive, value, 0)
	}
}

/// Shared (aliasable) reference field: identical wire shape to [`Owning`],
/// but the read-side registry allows the same id to be resolved through more
/// than one `Shared` field (spec §4.8's aliasing scenario — §8's "shared
/// `int`").
pub struct Shared<T: Describe> {
	descriptor: Rc<Descriptor<T>>,
}

impl<T: Describe> Shared<T> {
	pub fn new() -> Self {
		Self { descriptor: Rc::new(T::describe()) }
	}
}

impl<T: Describe> Default for Shared<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Describe + Default + 'static> FieldSerializer<Rc<RefCell<T>>> for Shared<T> {
	fn atom(&self) -> Atom {
		Atom::Reference
	}

	fn allocates(&self) -> bool {
		true
	}

	fn size(&self, _archive: &mut dyn OArchive, _value: &Rc<RefCell<T>>) -> Result<u64, WriteError> {
		Ok(4)
	}

	fn write(&self, archive: &mut dyn OArchive, value: &Rc<RefCell<T>>) -> Result<(), WriteError> {
		write_rc(&self.descriptor, archive, value)
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut Rc<RefCell<T>>, _byte_budget: u64) -> Result<(), ReadError> {
		*value = read_rc(&self.descriptor, archive, false)?;
		Ok(())
	}

	fn write_fixed(&self, archive: &mut dyn OArchive, value: &Rc<RefCell<T>>) -> Result<(), WriteError> {
		self.write(archive, value)
	}

	fn read_fixed(&self, archive: &mut dyn IArchive, value: &mut Rc<RefCell<T>>) -> Result<(), ReadError> {
		self.read(archive, value, 0)
	}
}

/// Raw, non-owning reference field: a [`Weak`] view into storage owned
/// elsewhere in the graph (by an [`Owning`] or [`Shared`] field, or the
/// root). On read this registers as a `Lookup`-mode entry (spec §4.8's
/// "Responsibility modes"), so the [`crate::arena::Arena`] — not this
/// field — is what keeps the referent alive once reading finishes.
pub struct Raw<T: Describe> {
	descriptor: Rc<Descriptor<T>>,
	_marker: PhantomData<T>,
}

impl<T: Describe> Raw<T> {
	pub fn new() -> Self {
		Self { descriptor: Rc::new(T::describe()), _marker: PhantomData }
	}
}

impl<T: Describe> Default for Raw<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Describe + Default + 'static> FieldSerializer<Weak<RefCell<T>>> for Raw<T> {
	fn atom(&self) -> Atom {
		Atom::Reference
	}

	fn size(&self, _archive: &mut dyn OArchive, _value: &Weak<RefCell<T>>) -> Result<u64, WriteError> {
		Ok(4)
	}

	fn write(&self, archive: &mut dyn OArchive, value: &Weak<RefCell<T>>) -> Result<(), WriteError> {
		match value.upgrade() {
			None => archive.write_object_reference(0, ObjectUnit::new(|_| Ok(0), |_| Ok(()))),
			Some(rc) => {
				let addr = Rc::as_ptr(&rc) as usize;
				archive.write_object_reference(addr, build_unit(&self.descriptor, rc))
			}
		}
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut Weak<RefCell<T>>, _byte_budget: u64) -> Result<(), ReadError> {
		let populate_descriptor = Rc::clone(&self.descriptor);
		let any = archive.read_object_reference(
			false,
			false,
			Box::new(|| Rc::new(RefCell::new(T::default())) as Rc<dyn Any>),
			Box::new(move |any, archive, budget| {
				let cell = any
					.downcast::<RefCell<T>>()
					.map_err(|_| ReadError::custom("object id resolved to an unexpected concrete type"))?;
				let mut guard = cell.borrow_mut();
				populate_descriptor.read(archive, &mut guard, budget)
			}),
		)?;
		*value = match any {
			None => Weak::new(),
			Some(any) => {
				let cell = any
					.downcast::<RefCell<T>>()
					.map_err(|_| ReadError::custom("object id resolved to an unexpected concrete type"))?;
				Rc::downgrade(&cell)
			}
		};
		Ok(())
	}

	fn write_fixed(&self, archive: &mut dyn OArchive, value: &Weak<RefCell<T>>) -> Result<(), WriteError> {
		self.write(archive, value)
	}

	fn read_fixed(&self, archive: &mut dyn IArchive, value: &mut Weak<RefCell<T>>) -> Result<(), ReadError> {
		self.read(archive, value, 0)
	}
}
