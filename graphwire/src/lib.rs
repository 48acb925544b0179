//! Schema-driven object-graph serialization over two wire formats: a native
//! varint codec supporting the full pointer-graph model (cycles, aliasing,
//! deferred object bodies), and a Protobuf-compatible codec for interop with
//! the wider Protobuf ecosystem (spec §1, §4).
//!
//! Types implement [`Describe`] (by hand, or via
//! `#[derive(graphwire_derive::Describe)]`) to participate. [`to_native`]/
//! [`from_native`] drive the full object graph through [`NativeWriter`]/
//! [`NativeReader`]; [`to_protobuf`]/[`from_protobuf`] drive one message
//! through [`ProtobufWriter`]/[`ProtobufReader`].

pub mod arena;
pub mod atom;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod native;
pub mod protobuf;
pub mod registry;
pub mod stream;
mod varint;

use std::cell::RefCell;
use std::rc::Rc;

pub use arena::Arena;
pub use atom::{Atom, WireKind};
pub use codec::{IArchive, OArchive};
pub use descriptor::{Describe, Descriptor};
pub use error::{ReadError, ReadErrorKind, WriteError, WriteErrorKind};
pub use native::{NativeReader, NativeWriter};
pub use protobuf::{ProtobufReader, ProtobufWriter};

use stream::SliceInput;

/// Serializes `value`'s whole object graph with the native codec, returning
/// the encoded bytes (spec §4.5.1).
pub fn to_native<T: Describe>(value: &T) -> Result<Vec<u8>, WriteError> {
	let mut out = Vec::new();
	let mut writer = NativeWriter::new(&mut out);
	writer.write_root(value)?;
	Ok(out)
}

/// Decodes a native-codec object graph rooted at `T` from `bytes`, returning
/// the root and the [`Arena`] owning every object it transitively referenced
/// (spec §4.5.2, §4.7).
pub fn from_native<T: Describe + Default + 'static>(bytes: &[u8]) -> Result<(Rc<RefCell<T>>, Arena), ReadError> {
	let mut input = SliceInput::new(bytes);
	let reader = NativeReader::new(&mut input);
	reader.read_root()
}

/// Serializes `value` as a single Protobuf-compatible message (spec §4.6).
/// Fails with [`WriteErrorKind::ProtobufIncompat`] if `T`'s descriptor has
/// any positional field.
pub fn to_protobuf<T: Describe>(value: &T) -> Result<Vec<u8>, WriteError> {
	let mut out = Vec::new();
	let mut writer = ProtobufWriter::new(&mut out);
	writer.write_message(value)?;
	Ok(out)
}

/// Decodes a single Protobuf-compatible message of type `T` from `bytes`.
pub fn from_protobuf<T: Describe + Default>(bytes: &[u8]) -> Result<T, ReadError> {
	let mut input = SliceInput::new(bytes);
	let reader = ProtobufReader::new(&mut input);
	reader.read_message()
}
