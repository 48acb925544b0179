//! The native codec's write side (spec §4.5.1): a length-prefixed varint
//! format where every distinct referenced object gets one id and one
//! deferred body, drained breadth-first after the root.

use crate::varint;
use crate::atom::Atom;
use crate::codec::{ArrayWrite, DictWrite, OArchive, ObjectUnit};
use crate::descriptor::{Describe, FieldSerializer};
use crate::error::WriteError;
use crate::registry::{WriteRegistry, WriteTask, ROOT_ID};
use crate::stream::OutputStream;

/// Drives [`OArchive`] over any [`OutputStream`] per spec §4.5.
pub struct NativeWriter<'s> {
	output: &'s mut dyn OutputStream,
	registry: WriteRegistry,
	scratch: Vec<u8>,
}

impl<'s> NativeWriter<'s> {
	pub fn new(output: &'s mut dyn OutputStream) -> Self {
		Self { output, registry: WriteRegistry::new(), scratch: Vec::new() }
	}

	fn emit_varint(&mut self, v: u64) -> Result<(), WriteError> {
		self.scratch.clear();
		varint::encode(v, &mut self.scratch);
		self.output.write(&self.scratch)
	}

	fn emit_tag(&mut self, id: u32, atom: Atom) -> Result<(), WriteError> {
		let tag = ((id as u64) << 3) | atom.wire_kind().protobuf_number() as u64;
		self.emit_varint(tag)
	}

	/// Writes `value`'s whole object graph: the root's framed body, then every
	/// object transitively reached through a `reference` field, draining the
	/// registry's deferred queue breadth-first (spec §4.5.1 "Root write").
	pub fn write_root<T: Describe>(&mut self, value: &T) -> Result<(), WriteError> {
		let descriptor = T::describe();
		self.registry.seed_root(value as *const T as usize);
		let size = descriptor.size(self, value)?;
		self.emit_tag(ROOT_ID, Atom::Descriptor)?;
		self.emit_varint(size)?;
		descriptor.write(self, value)?;
		while let Some(task) = self.registry.pop_deferred() {
			let size = task.unit.size(self)?;
			self.emit_tag(task.id, Atom::Descriptor)?;
			self.emit_varint(size)?;
			task.unit.write(self)?;
		}
		Ok(())
	}
}

impl OArchive for NativeWriter<'_> {
	fn write_bytes(&mut self, buf: &[u8]) -> Result<(), WriteError> {
		self.output.write(buf)
	}

	fn write_bool(&mut self, v: bool) -> Result<(), WriteError> {
		self.output.write(&[v as u8])
	}

	fn write_integer(&mut self, v: i64, _atom: Atom) -> Result<(), WriteError> {
		self.scratch.clear();
		varint::encode_signed(v, &mut self.scratch);
		self.output.write(&self.scratch)
	}

	fn write_f32(&mut self, v: f32) -> Result<(), WriteError> {
		self.output.write(&v.to_le_bytes())
	}

	fn write_f64(&mut self, v: f64) -> Result<(), WriteError> {
		self.output.write(&v.to_le_bytes())
	}

	fn write_string(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
		self.output.write(&(bytes.len() as u32).to_le_bytes())?;
		self.output.write(bytes)
	}

	fn size_integer(&self, v: i64, _atom: Atom) -> u64 {
		varint::encoded_len(v as u64)
	}

	fn size_string(&self, len: usize) -> u64 {
		4 + len as u64
	}

	fn write_identified_tag(&mut self, identifier: u32, atom: Atom) -> Result<(), WriteError> {
		self.emit_tag(identifier, atom)
	}

	fn size_identified_tag(&self, identifier: u32, atom: Atom) -> u64 {
		let tag = ((identifier as u64) << 3) | atom.wire_kind().protobuf_number() as u64;
		varint::encoded_len(tag)
	}

	fn write_length_prefix(&mut self, n: u64) -> Result<(), WriteError> {
		self.emit_varint(n)
	}

	fn size_length_prefix(&self, n: u64) -> u64 {
		varint::encoded_len(n)
	}

	fn begin_descriptor(&mut self, _type_name: &'static str, _has_positional: bool) -> Result<(), WriteError> {
		Ok(())
	}

	fn write_object_reference(&mut self, addr: usize, unit: ObjectUnit) -> Result<(), WriteError> {
		let id = self.registry.resolve(addr, |id| WriteTask { id, unit });
		self.output.write(&id.to_le_bytes())
	}

	fn write_array(&mut self, array: &dyn ArrayWrite) -> Result<(), WriteError> {
		let len = array.len();
		if len > i32::MAX as usize {
			return Err(WriteError::too_large(len));
		}
		match array.fixed_width() {
			Some(_) => {
				self.output.write(&(len as u32).to_le_bytes())?;
				for i in 0..len {
					array.write_fixed_element(self, i)?;
				}
			}
			None => {
				self.output.write(&((len as u32) | 0x8000_0000).to_le_bytes())?;
				for i in 0..len {
					let size = array.size_element(self, i)?;
					self.emit_varint(size)?;
					array.write_element(self, i)?;
				}
			}
		}
		Ok(())
	}

	fn size_array(&mut self, array: &dyn ArrayWrite) -> Result<u64, WriteError> {
		let len = array.len();
		let mut total = 4u64;
		match array.fixed_width() {
			Some(width) => total += (width as u64) * len as u64,
			None => {
				for i in 0..len {
					let size = array.size_element(self, i)?;
					total += varint::encoded_len(size) + size;
				}
			}
		}
		Ok(total)
	}

	fn write_dictionary(&mut self, dict: &dyn DictWrite) -> Result<(), WriteError> {
		self.output.write(&(dict.len() as u32).to_le_bytes())?;
		for i in 0..dict.len() {
			dict.write_key(self, i)?;
			dict.write_value(self, i)?;
		}
		Ok(())
	}

	fn size_dictionary(&mut self, dict: &dyn DictWrite) -> Result<u64, WriteError> {
		let mut total = 4u64;
		for i in 0..dict.len() {
			total += dict.size_key(self, i)?;
			total += dict.size_value(self, i)?;
		}
		Ok(total)
	}
}
