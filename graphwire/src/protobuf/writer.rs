//! The Protobuf-compatible codec's write side (spec §4.6): the same
//! descriptor-driven field loop as [`crate::native::NativeWriter`], but
//! arrays and maps expand into repeated tags instead of one length-delimited
//! blob, and reference fields have no representation at all — there is no
//! pointer registry here, only plain embedded messages.

use std::cell::Cell;

use crate::atom::{Atom, WireKind};
use crate::codec::{ArrayWrite, DictWrite, OArchive, ObjectUnit};
use crate::descriptor::{Describe, FieldSerializer};
use crate::error::WriteError;
use crate::stream::OutputStream;
use crate::varint;

fn tag_len(identifier: u32, atom: Atom) -> u64 {
	varint::encoded_len(((identifier as u64) << 3) | atom.wire_kind().protobuf_number() as u64)
}

fn framed_len(atom: Atom, payload: u64) -> u64 {
	if atom.wire_kind() == WireKind::LenDelimited {
		varint::encoded_len(payload) + payload
	} else {
		payload
	}
}

/// Drives [`OArchive`] over any [`OutputStream`] per spec §4.6.
pub struct ProtobufWriter<'s> {
	output: &'s mut dyn OutputStream,
	scratch: Vec<u8>,
	/// The `(identifier, atom)` of the most recent
	/// [`write_identified_tag`](OArchive::write_identified_tag)/
	/// [`size_identified_tag`](OArchive::size_identified_tag) call. `Array`
	/// and `Map` atoms defer their tag (and suppress the generic length
	/// prefix) until [`write_array`](OArchive::write_array)/
	/// [`write_dictionary`](OArchive::write_dictionary) emit one tag per
	/// element/entry instead. A `Cell` because the size-computing half of
	/// this pair takes `&self`, not `&mut self`.
	pending: Cell<Option<(u32, Atom)>>,
}

impl<'s> ProtobufWriter<'s> {
	pub fn new(output: &'s mut dyn OutputStream) -> Self {
		Self { output, scratch: Vec::new(), pending: Cell::new(None) }
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

	fn pending_identifier(&self) -> u32 {
		self.pending
			.get()
			.expect("write_array/write_dictionary called without a preceding write_identified_tag")
			.0
	}

	/// Writes `value`'s message as the whole stream (spec §4.6's
	/// Person-message interop scenario — a single root message, no deferred
	/// queue, since this codec never represents references).
	pub fn write_message<T: Describe>(&mut self, value: &T) -> Result<(), WriteError> {
		let descriptor = T::describe();
		descriptor.write(self, value)
	}
}

impl OArchive for ProtobufWriter<'_> {
	fn write_bytes(&mut self, buf: &[u8]) -> Result<(), WriteError> {
		self.output.write(buf)
	}

	fn write_bool(&mut self, v: bool) -> Result<(), WriteError> {
		self.emit_varint(v as u64)
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

	/// Raw bytes only — unlike the native codec, Protobuf strings carry
	/// exactly one length, and the generic identified-field framing in
	/// [`crate::descriptor::Descriptor::write`] already supplies it via
	/// [`write_length_prefix`](OArchive::write_length_prefix).
	fn write_string(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
		self.output.write(bytes)
	}

	fn size_integer(&self, v: i64, _atom: Atom) -> u64 {
		varint::encoded_len(v as u64)
	}

	fn size_string(&self, len: usize) -> u64 {
		len as u64
	}

	fn write_identified_tag(&mut self, identifier: u32, atom: Atom) -> Result<(), WriteError> {
		self.pending.set(Some((identifier, atom)));
		if !matches!(atom, Atom::Array | Atom::Map) {
			self.emit_tag(identifier, atom)?;
		}
		Ok(())
	}

	fn size_identified_tag(&self, identifier: u32, atom: Atom) -> u64 {
		self.pending.set(Some((identifier, atom)));
		match atom {
			Atom::Array | Atom::Map => 0,
			_ => tag_len(identifier, atom),
		}
	}

	fn write_length_prefix(&mut self, n: u64) -> Result<(), WriteError> {
		match self.pending.get() {
			Some((_, Atom::Array)) | Some((_, Atom::Map)) => Ok(()),
			_ => self.emit_varint(n),
		}
	}

	fn size_length_prefix(&self, n: u64) -> u64 {
		match self.pending.get() {
			Some((_, Atom::Array)) | Some((_, Atom::Map)) => 0,
			_ => varint::encoded_len(n),
		}
	}

	fn begin_descriptor(&mut self, type_name: &'static str, has_positional: bool) -> Result<(), WriteError> {
		if has_positional {
			return Err(WriteError::protobuf_incompat(type_name));
		}
		Ok(())
	}

	fn write_object_reference(&mut self, _addr: usize, _unit: ObjectUnit) -> Result<(), WriteError> {
		Err(WriteError::custom(
			"the Protobuf codec has no pointer registry; Owning/Shared/Raw reference fields are not representable",
		))
	}

	fn write_array(&mut self, array: &dyn ArrayWrite) -> Result<(), WriteError> {
		let identifier = self.pending_identifier();
		for i in 0..array.len() {
			self.emit_tag(identifier, array.element_atom())?;
			if array.element_atom().wire_kind() == WireKind::LenDelimited {
				let size = array.size_element(self, i)?;
				self.emit_varint(size)?;
			}
			array.write_element(self, i)?;
		}
		Ok(())
	}

	fn size_array(&mut self, array: &dyn ArrayWrite) -> Result<u64, WriteError> {
		let identifier = self.pending_identifier();
		let mut total = 0u64;
		for i in 0..array.len() {
			let elem_size = array.size_element(self, i)?;
			total += tag_len(identifier, array.element_atom()) + framed_len(array.element_atom(), elem_size);
		}
		Ok(total)
	}

	/// Spec §4.6: "each entry is a len-delimited message with exactly two
	/// identified fields — id 1 = key, id 2 = value", repeated under the
	/// field's own identifier like a non-packed array element.
	fn write_dictionary(&mut self, dict: &dyn DictWrite) -> Result<(), WriteError> {
		let identifier = self.pending_identifier();
		for i in 0..dict.len() {
			let key_payload = dict.size_key(self, i)?;
			let value_payload = dict.size_value(self, i)?;
			let entry_size = tag_len(1, dict.key_atom())
				+ framed_len(dict.key_atom(), key_payload)
				+ tag_len(2, dict.value_atom())
				+ framed_len(dict.value_atom(), value_payload);
			self.emit_tag(identifier, Atom::Descriptor)?;
			self.emit_varint(entry_size)?;
			self.emit_tag(1, dict.key_atom())?;
			if dict.key_atom().wire_kind() == WireKind::LenDelimited {
				self.emit_varint(key_payload)?;
			}
			dict.write_key(self, i)?;
			self.emit_tag(2, dict.value_atom())?;
			if dict.value_atom().wire_kind() == WireKind::LenDelimited {
				self.emit_varint(value_payload)?;
			}
			dict.write_value(self, i)?;
		}
		Ok(())
	}

	fn size_dictionary(&mut self, dict: &dyn DictWrite) -> Result<u64, WriteError> {
		let identifier = self.pending_identifier();
		let mut total = 0u64;
		for i in 0..dict.len() {
			let key_payload = dict.size_key(self, i)?;
			let value_payload = dict.size_value(self, i)?;
			let entry_size = tag_len(1, dict.key_atom())
				+ framed_len(dict.key_atom(), key_payload)
				+ tag_len(2, dict.value_atom())
				+ framed_len(dict.value_atom(), value_payload);
			total += tag_len(identifier, Atom::Descriptor) + varint::encoded_len(entry_size) + entry_size;
		}
		Ok(total)
	}
}
