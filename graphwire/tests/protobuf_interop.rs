//! Cross-implementation interop (spec §4.6, §8 "Person message"): bytes this
//! crate's Protobuf codec produces/consumes must match what a real Protobuf
//! implementation produces/consumes for the same field layout.

use graphwire_derive::Describe;
use pretty_assertions::assert_eq;
use prost::Message;

#[derive(Describe, Default, Debug, PartialEq)]
struct Person {
	#[graphwire(id = 1)]
	name: String,
	#[graphwire(id = 2)]
	age: i32,
	#[graphwire(id = 3)]
	phones: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
struct ProstPerson {
	#[prost(string, tag = "1")]
	name: String,
	#[prost(int32, tag = "2")]
	age: i32,
	#[prost(string, repeated, tag = "3")]
	phones: Vec<String>,
}

#[test]
fn graphwire_encoding_decodes_with_a_real_protobuf_implementation() {
	let value = Person { name: "Ada".to_owned(), age: 36, phones: vec!["555-0100".to_owned(), "555-0101".to_owned()] };

	let bytes = graphwire::to_protobuf(&value).unwrap();
	let decoded = ProstPerson::decode(bytes.as_slice()).unwrap();

	assert_eq!(decoded.name, value.name);
	assert_eq!(decoded.age, value.age);
	assert_eq!(decoded.phones, value.phones);
}

#[test]
fn a_real_protobuf_encoding_decodes_with_graphwire() {
	let prost_value =
		ProstPerson { name: "Grace".to_owned(), age: 85, phones: vec!["555-0199".to_owned()] };
	let bytes = prost_value.encode_to_vec();

	let decoded: Person = graphwire::from_protobuf(&bytes).unwrap();

	assert_eq!(decoded.name, prost_value.name);
	assert_eq!(decoded.age, prost_value.age);
	assert_eq!(decoded.phones, prost_value.phones);
}

#[test]
fn default_valued_message_still_emits_its_scalar_fields() {
	// This codec has no field-presence tracking, so unlike a real proto3
	// implementation it does not omit default-valued scalars — only an
	// empty repeated field emits nothing, since its framing is entirely
	// per-element.
	let value = Person::default();
	let bytes = graphwire::to_protobuf(&value).unwrap();
	assert_eq!(bytes, vec![0x0A, 0x00, 0x10, 0x00]);
	let decoded: Person = graphwire::from_protobuf(&bytes).unwrap();
	assert_eq!(decoded, value);
}

#[derive(Describe, Default)]
struct HasBase {
	#[graphwire(positional)]
	base: Person,
}

#[test]
fn positional_fields_are_rejected_by_the_protobuf_writer() {
	let err = graphwire::to_protobuf(&HasBase::default()).unwrap_err();
	assert_eq!(err.kind(), graphwire::WriteErrorKind::ProtobufIncompat);
}
