//! The kind of serialized unit a field maps to, independent of its in-memory
//! representation.

/// The kind of serialized unit. Distinct from the in-memory type: a `u32`
/// field and an `i32` field are both [`Atom::I32`], and an `Rc<T>` and a
/// `Box<T>` are both [`Atom::Reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atom {
	Ignored,
	Bool,
	I8,
	I16,
	I32,
	I64,
	F32,
	F64,
	Reference,
	Array,
	String,
	Map,
	Descriptor,
	FinalizedDescriptor,
}

/// The wire-level framing an [`Atom`] maps to. Four kinds cover every atom:
/// varint-encoded integers, two fixed-width float encodings, and one
/// length-delimited catch-all for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
	Varint,
	B32,
	B64,
	LenDelimited,
}

impl Atom {
	/// The wire kind used to frame an identified (tagged) field of this atom,
	/// shared between the native and Protobuf codecs (spec §4.5.1/§4.6). A
	/// reference is framed like any other length-delimited payload even though
	/// its body is a fixed four bytes: the size varint in front is what lets a
	/// reader that doesn't know the field skip over it.
	pub fn wire_kind(self) -> WireKind {
		match self {
			Atom::Bool | Atom::I8 | Atom::I16 | Atom::I32 | Atom::I64 => WireKind::Varint,
			Atom::F32 => WireKind::B32,
			Atom::F64 => WireKind::B64,
			Atom::Reference
			| Atom::String
			| Atom::Array
			| Atom::Map
			| Atom::Descriptor
			| Atom::FinalizedDescriptor => WireKind::LenDelimited,
			Atom::Ignored => WireKind::Varint,
		}
	}

	/// The fixed encoded width of one value of this atom when it appears as an
	/// array element written in "immutable size" (back-to-back) mode, or `None`
	/// if elements of this atom vary in encoded size and must use the counted
	/// array form (spec §4.5.1, §8 scenario 6). This is a property of the
	/// *array* encoding specifically: the same atom standing alone as a field
	/// still goes through `write_integer`'s varint form.
	pub fn fixed_width(self) -> Option<usize> {
		match self {
			Atom::Bool | Atom::I8 => Some(1),
			Atom::I16 => Some(2),
			Atom::I32 | Atom::F32 | Atom::Reference => Some(4),
			Atom::I64 | Atom::F64 => Some(8),
			Atom::String
			| Atom::Array
			| Atom::Map
			| Atom::Descriptor
			| Atom::FinalizedDescriptor
			| Atom::Ignored => None,
		}
	}
}

impl WireKind {
	pub const fn protobuf_number(self) -> u32 {
		match self {
			WireKind::Varint => 0,
			WireKind::B64 => 1,
			WireKind::LenDelimited => 2,
			WireKind::B32 => 5,
		}
	}

	pub fn from_protobuf_number(n: u32) -> Option<Self> {
		match n {
			0 => Some(WireKind::Varint),
			1 => Some(WireKind::B64),
			2 => Some(WireKind::LenDelimited),
			5 => Some(WireKind::B32),
			_ => None,
		}
	}
}
