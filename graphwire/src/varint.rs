//! Base-128 varint encoding (spec §4.5.3), shared by the native and Protobuf
//! codecs — both use the same unsigned LEB128 scheme, and neither zigzags
//! signed values. `integer-encoding`'s signed `VarInt` impls do zigzag, so
//! signed values go through its `u64` impl ourselves via an `as` cast, which
//! preserves the bit pattern instead of remapping it.
//!
//! Decoding is not here: it needs to advance each reader's own `count`
//! field one byte at a time, so it lives as a private method on
//! [`crate::native::NativeReader`]/[`crate::protobuf::ProtobufReader`].

use integer_encoding::VarInt;

/// Encoded length of `v` in bytes (1 for zero, up to 10 for values with the
/// high bit set).
pub fn encoded_len(v: u64) -> u64 {
	v.required_space() as u64
}

pub fn encode(v: u64, out: &mut Vec<u8>) {
	let mut buf = [0u8; 10];
	let n = v.encode_var(&mut buf);
	out.extend_from_slice(&buf[..n]);
}

/// Reinterprets `v`'s bits as `u64` and encodes it (spec: "signed values are
/// reinterpreted bit-wise through the unsigned encoder").
pub fn encode_signed(v: i64, out: &mut Vec<u8>) {
	encode(v as u64, out)
}
