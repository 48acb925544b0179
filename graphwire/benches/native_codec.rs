//! Encode/decode throughput over the native codec, small and big records.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use graphwire_derive::Describe;

#[derive(Describe, Default, Clone)]
struct SmallRecord {
	#[graphwire(id = 1)]
	field: String,
}

#[derive(Describe, Default, Clone)]
struct Address {
	#[graphwire(id = 1)]
	street: String,
	#[graphwire(id = 2)]
	city: String,
	#[graphwire(id = 3)]
	state_prov: String,
	#[graphwire(id = 4)]
	country: String,
	#[graphwire(id = 5)]
	zip: String,
}

#[derive(Describe, Default, Clone)]
struct BigRecord {
	#[graphwire(id = 1)]
	username: String,
	#[graphwire(id = 2)]
	age: u32,
	#[graphwire(id = 3)]
	phone: String,
	#[graphwire(id = 4)]
	housenum: String,
	#[graphwire(id = 5)]
	address: Address,
}

fn make_small_record() -> SmallRecord {
	SmallRecord { field: "foo".to_owned() }
}

fn make_big_record() -> BigRecord {
	BigRecord {
		username: "username".to_owned(),
		age: 10,
		phone: "000000000".to_owned(),
		housenum: "0000".to_owned(),
		address: Address {
			street: "street".to_owned(),
			city: "city".to_owned(),
			state_prov: "state_prov".to_owned(),
			country: "country".to_owned(),
			zip: "zip".to_owned(),
		},
	}
}

fn bench_small_record(c: &mut Criterion) {
	let record = make_small_record();
	let bytes = graphwire::to_native(&record).unwrap();
	c.bench_with_input(BenchmarkId::new("native_codec", "small_write"), &record, |b, record| {
		b.iter(|| graphwire::to_native(record).unwrap())
	});
	c.bench_with_input(BenchmarkId::new("native_codec", "small_read"), &bytes, |b, bytes| {
		b.iter(|| graphwire::from_native::<SmallRecord>(bytes).unwrap())
	});
}

fn bench_big_record(c: &mut Criterion) {
	let record = make_big_record();
	let bytes = graphwire::to_native(&record).unwrap();
	c.bench_with_input(BenchmarkId::new("native_codec", "big_write"), &record, |b, record| {
		b.iter(|| graphwire::to_native(record).unwrap())
	});
	c.bench_with_input(BenchmarkId::new("native_codec", "big_read"), &bytes, |b, bytes| {
		b.iter(|| graphwire::from_native::<BigRecord>(bytes).unwrap())
	});
}

criterion_group!(benches, bench_small_record, bench_big_record);
criterion_main!(benches);
