//! The Protobuf-compatible codec's read side (spec §4.6): the same tag and
//! varint framing as [`crate::native::NativeReader`], but arrays and maps
//! arrive as repeated tags rather than one length-delimited blob, and
//! reference fields have no representation at all.

use std::any::Any;
use std::rc::Rc;

use crate::atom::{Atom, WireKind};
use crate::codec::{ArrayRead, DictRead, IArchive};
use crate::descriptor::{Describe, FieldSerializer};
use crate::error::ReadError;
use crate::stream::InputStream;

/// Drives [`IArchive`] over any [`InputStream`] per spec §4.6.
pub struct ProtobufReader<'s> {
	input: &'s mut dyn InputStream,
	count: u64,
}

impl<'s> ProtobufReader<'s> {
	pub fn new(input: &'s mut dyn InputStream) -> Self {
		Self { input, count: 0 }
	}

	/// Reads one base-128 varint (spec §4.5.3), advancing [`count`](Self::count)
	/// one byte at a time.
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

	fn payload_budget(&mut self, kind: WireKind) -> Result<u64, ReadError> {
		match kind {
			WireKind::Varint => Ok(0),
			WireKind::B32 => Ok(4),
			WireKind::B64 => Ok(8),
			WireKind::LenDelimited => self.decode_varint(),
		}
	}

	/// Reads a whole message rooted at `T` (the Person-message interop
	/// scenario of spec §4.6): a single top-level descriptor read bounded by
	/// however many bytes `input` holds, with no root tag and no deferred
	/// queue — this codec never represents references, so there is nothing
	/// to defer. Unlike the native root, a Protobuf message carries no
	/// self-delimiting envelope of its own, so `input` must report a known
	/// [`length`](crate::stream::InputStream::length) — true of
	/// [`SliceInput`](crate::stream::SliceInput), the usual source for
	/// decoding an already-received message.
	pub fn read_message<T: Describe + Default>(mut self) -> Result<T, ReadError> {
		let descriptor = T::describe();
		let mut value = T::default();
		let budget = self
			.input
			.length()
			.ok_or_else(|| ReadError::custom("Protobuf message reads require a stream with a known length"))?;
		descriptor.read(&mut self, &mut value, budget)?;
		Ok(value)
	}
}

impl IArchive for ProtobufReader<'_> {
	fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
		self.input.read_exact(buf)?;
		self.count += buf.len() as u64;
		Ok(())
	}

	fn read_bool(&mut self) -> Result<bool, ReadError> {
		Ok(self.decode_varint()? != 0)
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

	/// `byte_budget` is the one and only length this field carries — already
	/// decoded by [`read_descriptor`](Self::read_descriptor)'s tag loop from
	/// the field's length-delimited prefix — so this reads exactly that many
	/// raw bytes with no length of its own.
	fn read_string(&mut self, byte_budget: u64) -> Result<Vec<u8>, ReadError> {
		let mut bytes = vec![0u8; byte_budget as usize];
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
		_responsible: bool,
		_unique: bool,
		_alloc: Box<dyn FnOnce() -> Rc<dyn Any>>,
		_populate: Box<dyn FnOnce(Rc<dyn Any>, &mut dyn IArchive, u64) -> Result<(), ReadError>>,
	) -> Result<Option<Rc<dyn Any>>, ReadError> {
		Err(ReadError::custom(
			"the Protobuf codec has no pointer registry; Owning/Shared/Raw reference fields are not representable",
		))
	}

	/// Called once per occurrence of the array field's tag (spec §4.6:
	/// "non-packed" — no count prefix), appending the one element this
	/// occurrence carries.
	fn read_array(&mut self, array: &mut dyn ArrayRead, byte_budget: u64) -> Result<(), ReadError> {
		array.reserve(1);
		array.read_element(self, byte_budget)
	}

	/// Called once per occurrence of the map field's tag, each one a
	/// two-field sub-message (`1` = key, `2` = value) read through the same
	/// tag-dispatch loop as [`read_descriptor`](Self::read_descriptor).
	fn read_dictionary(&mut self, dict: &mut dyn DictRead, byte_budget: u64) -> Result<(), ReadError> {
		let limit = self.count() + byte_budget;
		while self.count() < limit {
			let (identifier, wire_kind) = self.read_tag()?;
			match identifier {
				1 => {
					let budget = self.payload_budget(wire_kind)?;
					dict.read_key(self, budget)?;
				}
				2 => {
					let budget = self.payload_budget(wire_kind)?;
					dict.read_value_and_insert(self, budget)?;
				}
				_ => self.skip_payload(wire_kind)?,
			}
		}
		if self.count() > limit {
			return Err(ReadError::framing_mismatch(self.count(), byte_budget));
		}
		Ok(())
	}
}
