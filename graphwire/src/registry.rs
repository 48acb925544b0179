//! The pointer registry: the id↔address bookkeeping that lets a codec walk
//! arbitrary object graphs, including cycles and aliasing, by reference
//! (spec §4.8). One flavor runs during writing (address → id, a deferred
//! FIFO of not-yet-emitted bodies); the other runs during reading (id →
//! object, a FIFO of not-yet-populated bodies).
//!
//! Both sides store object identity without borrowing: write identity is
//! just `value as *const T as usize`, a plain pointer-to-integer cast with no
//! `unsafe`; read identity is a type-erased `Rc<dyn Any>`, downcast back to
//! the concrete `RefCell<T>` at the point of use. This is the idiomatic-Rust
//! analogue of the original's `void*`-keyed `obj_map` (Design Note 1/3).

use std::any::Any;
use std::collections::VecDeque;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ReadError;

/// Null/root sentinel id, reserved exactly as in spec §3/§4.8.
pub const NULL_ID: u32 = 0;
/// The id the root object is seeded under before the read work queue starts.
pub const ROOT_ID: u32 = 1;
/// Default cap on distinct object ids a single read may allocate, guarding
/// against a corrupt or hostile stream minting unbounded ids.
pub const DEFAULT_MAX_OBJECTS: u32 = 1_000_000;

/// One not-yet-emitted object body, captured at the point its id was minted.
pub(crate) struct WriteTask {
	pub id: u32,
	pub unit: crate::codec::ObjectUnit,
}

/// Write-side `obj_map` + deferred queue (spec §3, §4.8 "Write").
#[derive(Default)]
pub(crate) struct WriteRegistry {
	next_id: u32,
	ids: HashMap<usize, u32>,
	deferred: VecDeque<WriteTask>,
}

impl WriteRegistry {
	pub fn new() -> Self {
		Self { next_id: ROOT_ID + 1, ids: HashMap::new(), deferred: VecDeque::new() }
	}

	/// Registers `addr` as the root object's own address, so a later
	/// reference back to it resolves to [`ROOT_ID`] instead of minting a
	/// second, colliding id for the same object (spec §4.8: "every distinct
	/// non-null object address ... exactly one id is minted").
	pub fn seed_root(&mut self, addr: usize) {
		if addr != 0 {
			self.ids.insert(addr, ROOT_ID);
		}
	}

	/// Resolves `addr` (0 for null) to its id, minting and enqueueing a new
	/// one via `make_task` on first sight. Returns the id to emit inline.
	pub fn resolve(
		&mut self,
		addr: usize,
		make_task: impl FnOnce(u32) -> WriteTask,
	) -> u32 {
		if addr == 0 {
			return NULL_ID;
		}
		if let Some(&id) = self.ids.get(&addr) {
			return id;
		}
		let id = self.next_id;
		self.next_id += 1;
		self.ids.insert(addr, id);
		self.deferred.push_back(make_task(id));
		id
	}

	pub fn pop_deferred(&mut self) -> Option<WriteTask> {
		self.deferred.pop_front()
	}

	pub fn has_pending(&self) -> bool {
		!self.deferred.is_empty()
	}
}

/// Whether a read-side registry entry's lifetime is managed by the archive
/// (eventually handed to the [`Arena`](crate::arena::Arena)) or has been
/// handed off to the caller (spec §4.8 "Responsibility modes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ownership {
	Lookup,
	Released,
}

struct ReadEntry {
	value: Rc<dyn Any>,
	ownership: Ownership,
}

/// One not-yet-populated object body, captured at the point its id was first
/// allocated.
pub(crate) struct ReadTask {
	pub id: u32,
	pub run: Box<dyn FnOnce(&mut dyn crate::codec::IArchive, u64) -> Result<(), ReadError>>,
}

/// Read-side `obj_map` + work queue (spec §3, §4.8 "Read").
#[derive(Default)]
pub(crate) struct ReadRegistry {
	objects: HashMap<u32, ReadEntry>,
	work: VecDeque<ReadTask>,
	max_objects: u32,
}

impl ReadRegistry {
	pub fn new(max_objects: u32) -> Self {
		Self { objects: HashMap::new(), work: VecDeque::new(), max_objects }
	}

	/// Resolves `id` to its registered object, allocating via `alloc` and
	/// enqueueing `populate` on first sight. `unique` enforces that a
	/// `Release`-mode id is never looked up a second time after release
	/// (spec: "two unique pointers cannot alias the same object").
	pub fn resolve(
		&mut self,
		id: u32,
		ownership: Ownership,
		unique: bool,
		alloc: impl FnOnce() -> Rc<dyn Any>,
		populate: impl FnOnce(Rc<dyn Any>, &mut dyn crate::codec::IArchive, u64) -> Result<(), ReadError> + 'static,
	) -> Result<Rc<dyn Any>, ReadError> {
		if id == NULL_ID {
			return Err(ReadError::custom("attempted to resolve the null object id to a value"));
		}
		if let Some(entry) = self.objects.get(&id) {
			if unique && entry.ownership == Ownership::Released {
				return Err(ReadError::alias_violation(id));
			}
			return Ok(Rc::clone(&entry.value));
		}
		if self.objects.len() as u32 >= self.max_objects {
			return Err(ReadError::too_many_objects(self.max_objects));
		}
		let value = alloc();
		let task = ReadTask {
			id,
			run: {
				let value = Rc::clone(&value);
				Box::new(move |archive, budget| populate(value, archive, budget))
			},
		};
		self.objects.insert(id, ReadEntry { value: Rc::clone(&value), ownership });
		self.work.push_back(task);
		Ok(value)
	}

	pub fn seed_root(&mut self, value: Rc<dyn Any>) {
		self.objects.insert(ROOT_ID, ReadEntry { value, ownership: Ownership::Lookup });
	}

	pub fn pop_work(&mut self) -> Option<ReadTask> {
		self.work.pop_front()
	}

	/// Drains every `Lookup`-mode entry into an iterator of arena-owned
	/// handles, clearing the registry's own map (spec §4.7: "the archive's
	/// map is then cleared").
	pub fn drain_lookup_entries(&mut self) -> impl Iterator<Item = Rc<dyn Any>> + '_ {
		let ids: Vec<u32> = self
			.objects
			.iter()
			.filter(|(_, e)| e.ownership == Ownership::Lookup)
			.map(|(&id, _)| id)
			.collect();
		ids.into_iter().filter_map(move |id| self.objects.remove(&id)).map(|e| e.value)
	}
}
