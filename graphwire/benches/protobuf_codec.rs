//! Encode/decode throughput over the Protobuf-compatible codec, compared
//! against `prost` driving the same field layout.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use graphwire_derive::Describe;
use prost::Message;

#[derive(Describe, Default, Clone)]
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

fn make_person() -> Person {
	Person { name: "Ada Lovelace".to_owned(), age: 36, phones: vec!["555-0100".to_owned(), "555-0101".to_owned()] }
}

fn make_prost_person() -> ProstPerson {
	ProstPerson {
		name: "Ada Lovelace".to_owned(),
		age: 36,
		phones: vec!["555-0100".to_owned(), "555-0101".to_owned()],
	}
}

fn bench_write(c: &mut Criterion) {
	let person = make_person();
	let prost_person = make_prost_person();
	c.bench_with_input(BenchmarkId::new("protobuf_codec", "graphwire_write"), &person, |b, person| {
		b.iter(|| graphwire::to_protobuf(person).unwrap())
	});
	c.bench_with_input(BenchmarkId::new("protobuf_codec", "prost_write"), &prost_person, |b, person| {
		b.iter(|| person.encode_to_vec())
	});
}

fn bench_read(c: &mut Criterion) {
	let bytes = graphwire::to_protobuf(&make_person()).unwrap();
	c.bench_with_input(BenchmarkId::new("protobuf_codec", "graphwire_read"), &bytes, |b, bytes| {
		b.iter(|| graphwire::from_protobuf::<Person>(bytes).unwrap())
	});
	c.bench_with_input(BenchmarkId::new("protobuf_codec", "prost_read"), &bytes, |b, bytes| {
		b.iter(|| ProstPerson::decode(bytes.as_slice()).unwrap())
	});
}

criterion_group!(benches, bench_write, bench_read);
criterion_main!(benches);
