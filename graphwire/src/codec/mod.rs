//! The `OArchive`/`IArchive` contracts (spec §4.4): the one mandatory
//! abstraction boundary between the descriptor model and a concrete codec.
//! Every [`FieldSerializer`](crate::descriptor::FieldSerializer) is written
//! against these traits, never against the native or Protobuf writer/reader
//! concretely, so the same field code drives both codecs.

mod array;
mod dict;

pub use array::{ArrayRead, ArrayWrite};
pub use dict::{DictRead, DictWrite};

use std::any::Any;
use std::rc::Rc;

use crate::atom::{Atom, WireKind};
use crate::error::{ReadError, WriteError};

/// A not-yet-emitted (or about-to-be-emitted) object body, closing over a
/// concrete `Descriptor<T>` and the value it describes. Built by
/// [`crate::to_native`]/[`crate::to_protobuf`] for the root, and by
/// pointer-kind field serializers for every reference they write.
pub struct ObjectUnit {
	size: Box<dyn Fn(&mut dyn OArchive) -> Result<u64, WriteError>>,
	write: Box<dyn Fn(&mut dyn OArchive) -> Result<(), WriteError>>,
}

impl ObjectUnit {
	pub fn new(
		size: impl Fn(&mut dyn OArchive) -> Result<u64, WriteError> + 'static,
		write: impl Fn(&mut dyn OArchive) -> Result<(), WriteError> + 'static,
	) -> Self {
		Self { size: Box::new(size), write: Box::new(write) }
	}

	pub fn size(&self, archive: &mut dyn OArchive) -> Result<u64, WriteError> {
		(self.size)(archive)
	}

	pub fn write(&self, archive: &mut dyn OArchive) -> Result<(), WriteError> {
		(self.write)(archive)
	}
}

/// Write-side archive contract (spec §4.4). Implemented by
/// [`crate::native::NativeWriter`] and [`crate::protobuf::ProtobufWriter`].
pub trait OArchive {
	fn write_bytes(&mut self, buf: &[u8]) -> Result<(), WriteError>;
	fn write_bool(&mut self, v: bool) -> Result<(), WriteError>;
	/// Writes `v` in this codec's standalone-integer representation (a
	/// varint for both codecs; see spec §4.5.3).
	fn write_integer(&mut self, v: i64, atom: Atom) -> Result<(), WriteError>;
	fn write_f32(&mut self, v: f32) -> Result<(), WriteError>;
	fn write_f64(&mut self, v: f64) -> Result<(), WriteError>;
	/// Writes a length prefix followed by `bytes` (spec's `string` atom:
	/// `u32_le(char_count)` for native, a length varint for Protobuf).
	fn write_string(&mut self, bytes: &[u8]) -> Result<(), WriteError>;

	fn size_integer(&self, v: i64, atom: Atom) -> u64;
	fn size_string(&self, len: usize) -> u64;

	/// Emits the tag that introduces an identified field of the given atom.
	fn write_identified_tag(&mut self, identifier: u32, atom: Atom) -> Result<(), WriteError>;
	fn size_identified_tag(&self, identifier: u32, atom: Atom) -> u64;
	/// Emits the length prefix in front of a length-delimited payload. A
	/// no-op where the codec doesn't frame this atom with a size (there is
	/// none in this engine — both codecs always size length-delimited
	/// payloads — kept as its own method so the two can diverge later).
	fn write_length_prefix(&mut self, n: u64) -> Result<(), WriteError>;
	fn size_length_prefix(&self, n: u64) -> u64;

	/// Called once per descriptor write, before any fields. The Protobuf
	/// codec fails here if `has_positional` — positional fields have no
	/// Protobuf representation (spec §4.6).
	fn begin_descriptor(&mut self, type_name: &'static str, has_positional: bool) -> Result<(), WriteError>;

	/// Resolves `addr` (0 for null) through the write registry, deferring
	/// `unit`'s body to the native codec's queue on first sight, and emits
	/// whatever inline representation this codec uses for a reference.
	fn write_object_reference(&mut self, addr: usize, unit: ObjectUnit) -> Result<(), WriteError>;

	fn write_array(&mut self, array: &dyn ArrayWrite) -> Result<(), WriteError>;
	fn size_array(&mut self, array: &dyn ArrayWrite) -> Result<u64, WriteError>;
	fn write_dictionary(&mut self, dict: &dyn DictWrite) -> Result<(), WriteError>;
	fn size_dictionary(&mut self, dict: &dyn DictWrite) -> Result<u64, WriteError>;
}

/// Read-side archive contract (spec §4.4). Implemented by
/// [`crate::native::NativeReader`] and [`crate::protobuf::ProtobufReader`].
pub trait IArchive {
	fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), ReadError>;
	fn read_bool(&mut self) -> Result<bool, ReadError>;
	fn read_integer(&mut self, atom: Atom) -> Result<i64, ReadError>;
	fn read_f32(&mut self) -> Result<f32, ReadError>;
	fn read_f64(&mut self) -> Result<f64, ReadError>;
	/// Reads a string/bytes field's payload. The native codec ignores
	/// `byte_budget` and decodes its own embedded length; the Protobuf codec
	/// has no embedded length of its own and reads exactly `byte_budget`
	/// bytes, the length the generic identified-field framing already
	/// decoded (spec §4.6: "tag, then length varint, then payload bytes").
	fn read_string(&mut self, byte_budget: u64) -> Result<Vec<u8>, ReadError>;

	/// Reads the length prefix in front of a length-delimited payload that
	/// carries no tag of its own — a positional field's framing
	/// (`Descriptor::read`/`write`'s positional loop), the counterpart to
	/// [`OArchive::write_length_prefix`]. An identified field instead gets
	/// its budget from the wire kind decoded by
	/// [`read_tag`](Self::read_tag)/[`read_descriptor`](Self::read_descriptor).
	fn read_length_prefix(&mut self) -> Result<u64, ReadError>;

	/// Bytes consumed from the stream so far (spec's `count`).
	fn count(&self) -> u64;
	fn skip_bytes(&mut self, n: u64) -> Result<(), ReadError>;

	/// Reads one identified-field tag, returning its identifier and wire
	/// kind. Used by [`read_descriptor`](Self::read_descriptor)'s internal
	/// loop and exposed for the array/dictionary element framing that needs
	/// it directly.
	fn read_tag(&mut self) -> Result<(u32, WireKind), ReadError>;
	/// Skips one payload of the given wire kind — used for unknown
	/// identified fields (spec: "handled by skipping, not an error").
	fn skip_payload(&mut self, wire_kind: WireKind) -> Result<(), ReadError>;

	/// Drives a descriptor's identified-field tag loop (spec §4.5.2/§4.6):
	/// positional fields are read directly by
	/// [`Descriptor::read`](crate::descriptor::Descriptor) before this is
	/// called, since they need no tag dispatch. `lookup_identified` resolves
	/// a decoded identifier to a callback that reads that field's payload
	/// (handed the payload's byte budget, decoded from the wire kind), or
	/// `None` for an unknown field (skipped by wire kind).
	/// `lookup_identified` also returns the wire kind the target field's atom
	/// expects, which the loop checks against the tag's decoded wire kind
	/// before dispatching, raising [`ReadError::invalid_tag`] on mismatch
	/// (spec §7: a misframed stream is a hard error, not a silent misread).
	#[allow(clippy::type_complexity)]
	fn read_descriptor<'cb>(
		&mut self,
		byte_budget: u64,
		lookup_identified: &mut dyn FnMut(
			u32,
		) -> Option<(WireKind, Box<dyn FnOnce(&mut dyn IArchive, u64) -> Result<(), ReadError> + 'cb>)>,
	) -> Result<(), ReadError>;

	/// Resolves a reference atom's id through the read registry, or `None` if
	/// the wire carried the null id (spec §4.8: "null is assigned id 0").
	/// `responsible` selects the `Release` ownership mode (owning-pointer
	/// reads transfer cleanup to the caller); `unique` additionally forbids a
	/// second lookup of an id already responsibly released. `alloc`
	/// default-constructs the referent; `populate` is invoked once, later,
	/// with the allocated value, this same archive, and the per-field byte
	/// budget already decoded for it by the caller's wire format.
	#[allow(clippy::type_complexity)]
	fn read_object_reference(
		&mut self,
		responsible: bool,
		unique: bool,
		alloc: Box<dyn FnOnce() -> Rc<dyn Any>>,
		populate: Box<dyn FnOnce(Rc<dyn Any>, &mut dyn IArchive, u64) -> Result<(), ReadError>>,
	) -> Result<Option<Rc<dyn Any>>, ReadError>;

	/// Reads one field's worth of array content into `array`. The native
	/// codec ignores `byte_budget` and parses its own embedded count prefix
	/// in a single call; the Protobuf codec has no count prefix at all (spec
	/// §4.6: "non-packed" repeated fields) and this is called once per
	/// occurrence of the field's tag, each time appending exactly one
	/// element sized by `byte_budget`.
	fn read_array(&mut self, array: &mut dyn ArrayRead, byte_budget: u64) -> Result<(), ReadError>;
	/// Reads one field's worth of dictionary content into `dict`. The native
	/// codec ignores `byte_budget` and parses its own embedded count prefix
	/// in a single call; the Protobuf codec calls this once per occurrence of
	/// the field's tag, each time reading exactly one key/value entry
	/// (spec §4.6: "each entry is a len-delimited message ... emitted one per
	/// outer tag, like arrays").
	fn read_dictionary(&mut self, dict: &mut dyn DictRead, byte_budget: u64) -> Result<(), ReadError>;
}
