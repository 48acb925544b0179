//! The native codec's read side (spec §4.5.2): mirrors
//! [`super::writer::NativeWriter`] byte for byte — the same tag, varint, and
//! length-prefix framing, decoded instead of emitted, and the same FIFO
//! queue driving deferred object bodies after the root.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::arena::Arena;
use crate::atom::{Atom, WireKind};
use crate::codec::{ArrayRead, DictRead, IArchive};
use crate::descriptor::{Describe, FieldSerializer};
use crate::error::ReadError;
use crate::registry::{Ownership, ReadRegistry, DEFAULT_MAX_OBJECTS, NULL_ID, ROOT_ID};
use crate::stream::InputStream;

/// Drives [`IArchive`] over any [`InputStream`] per spec §4.5.
pub struct NativeReader<'s> {
	input: &'s mut dyn InputStream,
	registry: ReadRegistry,
	count: u64,
}

impl<'s> NativeReader<'s> {
	pub fn new(input: &'s mut dyn InputStream) -> Self {
		Self::with_max_objects(input, DEFAULT_MAX_OBJECTS)
	}

	pub fn with_max_objects(input: &'s mut dyn InputStream, max_objects: u32) -> Self {
		Self { input, registry: ReadRegistry::new(max_objects), count: 0 }
	}

	/// Reads one base-128 varint (spec §4.5.3), advancing [`count`](Self::count)
	/// one byte at a time — the reason decoding lives here rather than in
	/// [`crate::varint`], which only covers encoding.
	fn decode_varint(&mut self) -> Result<u64, ReadError> {
		let mut result: u64 = 0;
		let mut shift = 0u32;
		loop {
			let mut byte = [0u8; 1];
			self.input.read_exact(&mut byte)?;
			self.count += 1;
			result |= ((byte[0] & 0x7f) as u64) << shift;
			if byte[0] & 0x80 == 0 {
				break;
			}
			shift += 7;
			if shift >= 70 {
				return Err(ReadError::custom("varint exceeds the maximum 10-byte encoded width"));
			}
		}
		Ok(result)
	}

	/// The number of payload bytes a value of `kind` occupies, decoding a
	/// length varint for [`WireKind::LenDelimited`] (the same prefix
	/// [`super::writer::NativeWriter::write_root`]/[`crate::descriptor::Descriptor::write`]
	/// emit in front of every length-delimited identified field).
	fn payload_budget(&mut self, kind: WireKind) -> Result<u64, ReadError> {
		match kind {
			WireKind::Varint => Ok(0),
			WireKind::B32 => Ok(4),
			WireKind::B64 => Ok(8),
			WireKind::LenDelimited => self.decode_varint(),
		}
	}
}

impl IArchive for NativeReader<'_> {
	fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
		self.input.read_exact(buf)?;
		self.count += buf.len() as u64;
		Ok(())
	}

	fn read_bool(&mut self) -> Result<bool, ReadError> {
		let mut byte = [0u8; 1];
		self.read_bytes(&mut byte)?;
		Ok(byte[0] != 0)
	}

	fn read_integer(&mut self, _atom: Atom) -> Result<i64, ReadError> {
		Ok(self.decode_varint()? as i64)
	}

	fn read_f32(&mut self) -> Result<f32, ReadError> {
		let mut buf = [0u8; 4];
		self.read_bytes(&mut buf)?;
		Ok(f32::from_le_bytes(buf))
	}

	fn read_f64(&mut self) -> Result<f64, ReadError> {
		let mut buf = [0u8; 8];
		self.read_bytes(&mut buf)?;
		Ok(f64::from_le_bytes(buf))
	}

	fn read_string(&mut self, _byte_budget: u64) -> Result<Vec<u8>, ReadError> {
		let mut len_buf = [0u8; 4];
		self.read_bytes(&mut len_buf)?;
		let len = u32::from_le_bytes(len_buf) as usize;
		let mut bytes = vec![0u8; len];
		self.read_bytes(&mut bytes)?;
		Ok(bytes)
	}

	fn read_length_prefix(&mut self) -> Result<u64, ReadError> {
		self.decode_varint()
	}

	fn count(&self) -> u64 {
		self.count
	}

	fn skip_bytes(&mut self, n: u64) -> Result<(), ReadError> {
		let skipped = self.input.skip(n)?;
		self.count += skipped;
		if skipped < n {
			return Err(ReadError::unexpected_eof());
		}
		Ok(())
	}

	fn read_tag(&mut self) -> Result<(u32, WireKind), ReadError> {
		let tag = self.decode_varint()?;
		let kind_number = (tag & 0x7) as u32;
		let kind = WireKind::from_protobuf_number(kind_number)
			.ok_or_else(|| ReadError::invalid_tag(kind_number as u8))?;
		Ok(((tag >> 3) as u32, kind))
	}

	fn skip_payload(&mut self, wire_kind: WireKind) -> Result<(), ReadError> {
		match wire_kind {
			WireKind::Varint => {
				self.decode_varint()?;
				Ok(())
			}
			WireKind::B32 => self.skip_bytes(4),
			WireKind::B64 => self.skip_bytes(8),
			WireKind::LenDelimited => {
				let len = self.decode_varint()?;
				self.skip_bytes(len)
			}
		}
	}

	fn read_descriptor<'cb>(
		&mut self,
		byte_budget: u64,
		lookup_identified: &mut dyn FnMut(
			u32,
		) -> Option<(WireKind, Box<dyn FnOnce(&mut dyn IArchive, u64) -> Result<(), ReadError> + 'cb>)>,
	) -> Result<(), ReadError> {
		let limit = self.count() + byte_budget;
		while self.count() < limit {
			let (identifier, wire_kind) = self.read_tag()?;
			match lookup_identified(identifier) {
				Some((expected_kind, run)) => {
					if wire_kind != expected_kind {
						return Err(ReadError::invalid_tag(wire_kind.protobuf_number() as u8));
					}
					let budget = self.payload_budget(wire_kind)?;
					run(self, budget)?;
				}
				None => self.skip_payload(wire_kind)?,
			}
		}
		if self.count() > limit {
			return Err(ReadError::framing_mismatch(self.count(), byte_budget));
		}
		Ok(())
	}

	fn read_object_reference(
		&mut self,
		responsible: bool,
		unique: bool,
		alloc: Box<dyn FnOnce() -> Rc<dyn Any>>,
		populate: Box<dyn FnOnce(Rc<dyn Any>, &mut dyn IArchive, u64) -> Result<(), ReadError>>,
	) -> Result<Option<Rc<dyn Any>>, ReadError> {
		let mut buf = [0u8; 4];
		self.read_bytes(&mut buf)?;
		let id = u32::from_le_bytes(buf);
		if id == NULL_ID {
			return Ok(None);
		}
		let ownership = if responsible { Ownership::Released } else { Ownership::Lookup };
		let value = self.registry.resolve(id, ownership, unique, alloc, populate)?;
		Ok(Some(value))
	}

	fn read_array(&mut self, array: &mut dyn ArrayRead, _byte_budget: u64) -> Result<(), ReadError> {
		let mut len_buf = [0u8; 4];
		self.read_bytes(&mut len_buf)?;
		let raw = u32::from_le_bytes(len_buf);
		let counted = raw & 0x8000_0000 != 0;
		let len = (raw & 0x7fff_ffff) as usize;
		array.reserve(len);
		if counted {
			for _ in 0..len {
				let size = self.decode_varint()?;
				array.read_element(self, size)?;
			}
		} else {
			for _ in 0..len {
				array.read_fixed_element(self)?;
			}
		}
		Ok(())
	}

	fn read_dictionary(&mut self, dict: &mut dyn DictRead, _byte_budget: u64) -> Result<(), ReadError> {
		let mut len_buf = [0u8; 4];
		self.read_bytes(&mut len_buf)?;
		let len = u32::from_le_bytes(len_buf) as usize;
		for _ in 0..len {
			dict.read_key(self, 0)?;
			dict.read_value_and_insert(self, 0)?;
		}
		Ok(())
	}
}

impl<'s> NativeReader<'s> {
	/// Reads a whole object graph rooted at `T` (spec §4.5.2 "Root read"):
	/// seeds the root id in the registry, reads its framed body, then drains
	/// every deferred object the root (transitively) referenced, in the same
	/// order their ids were minted on write. Every `Lookup`-mode id still
	/// registered once the queue empties transfers into the returned
	/// [`Arena`], which becomes the caller's sole ownership handle over them.
	pub fn read_root<T: Describe + Default + 'static>(mut self) -> Result<(Rc<RefCell<T>>, Arena), ReadError> {
		let descriptor = T::describe();
		let root = Rc::new(RefCell::new(T::default()));
		self.registry.seed_root(Rc::clone(&root) as Rc<dyn Any>);

		let (id, kind) = self.read_tag()?;
		if id != ROOT_ID {
			return Err(ReadError::custom("stream does not open with the root object tag"));
		}
		let budget = self.payload_budget(kind)?;
		{
			let mut guard = root.borrow_mut();
			descriptor.read(&mut self, &mut guard, budget)?;
		}

		while let Some(task) = self.registry.pop_work() {
			let (task_id, kind) = self.read_tag()?;
			if task_id != task.id {
				return Err(ReadError::custom("deferred object id did not match the write queue's order"));
			}
			let budget = self.payload_budget(kind)?;
			(task.run)(&mut self, budget)?;
		}

		let mut arena = Arena::new();
		for entry in self.registry.drain_lookup_entries() {
			arena.push(entry);
		}
		Ok((root, arena))
	}
}
