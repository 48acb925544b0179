//! Round-trips of every leaf and container field kind through the native
//! codec (spec §4.2, §4.5, §8).

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use graphwire_derive::Describe;
use pretty_assertions::assert_eq;

#[derive(Describe, Default, Debug, PartialEq)]
struct Scalars {
	#[graphwire(id = 1)]
	flag: bool,
	#[graphwire(id = 2)]
	byte: i8,
	#[graphwire(id = 3)]
	short: i16,
	#[graphwire(id = 4)]
	word: i32,
	#[graphwire(id = 5)]
	quad: i64,
	#[graphwire(id = 6)]
	unsigned_word: u32,
	#[graphwire(id = 7)]
	single: f32,
	#[graphwire(id = 8)]
	double: f64,
	#[graphwire(id = 9)]
	name: String,
	#[graphwire(id = 10)]
	payload: Vec<u8>,
}

#[test]
fn scalars_round_trip() {
	let value = Scalars {
		flag: true,
		byte: -12,
		short: -1234,
		word: -123_456,
		quad: -123_456_789_012,
		unsigned_word: 0xdead_beef,
		single: 1.5,
		double: -2.25,
		name: "graphwire".to_owned(),
		payload: vec![0, 1, 2, 255],
	};
	let bytes = graphwire::to_native(&value).unwrap();
	let (decoded, _arena) = graphwire::from_native::<Scalars>(&bytes).unwrap();
	assert_eq!(*decoded.borrow(), value);
}

#[derive(Describe, Default, Debug, PartialEq)]
struct Collections {
	#[graphwire(id = 1)]
	numbers: Vec<i32>,
	#[graphwire(id = 2)]
	ordered: BTreeMap<String, i64>,
	#[graphwire(id = 3)]
	hashed: HashMap<i32, String>,
	#[graphwire(id = 4)]
	nested: Vec<Vec<i32>>,
	#[graphwire(id = 5)]
	timeout: Duration,
}

#[test]
fn collections_round_trip() {
	let mut ordered = BTreeMap::new();
	ordered.insert("a".to_owned(), 1);
	ordered.insert("b".to_owned(), 2);
	let mut hashed = HashMap::new();
	hashed.insert(1, "one".to_owned());
	hashed.insert(2, "two".to_owned());

	let value = Collections {
		numbers: vec![1, 2, 3, 4],
		ordered,
		hashed,
		nested: vec![vec![1, 2], vec![], vec![3]],
		timeout: Duration::from_millis(2500),
	};
	let bytes = graphwire::to_native(&value).unwrap();
	let (decoded, _arena) = graphwire::from_native::<Collections>(&bytes).unwrap();
	assert_eq!(*decoded.borrow(), value);
}

#[derive(Describe, Default, Debug, PartialEq)]
struct WithDurationUnits {
	#[graphwire(id = 1, period = "millis")]
	timeout_ms: Duration,
	#[graphwire(id = 2, period = "seconds")]
	retry_after: Duration,
}

#[test]
fn duration_periods_round_trip() {
	let value = WithDurationUnits { timeout_ms: Duration::from_millis(750), retry_after: Duration::from_secs(30) };
	let bytes = graphwire::to_native(&value).unwrap();
	let (decoded, _arena) = graphwire::from_native::<WithDurationUnits>(&bytes).unwrap();
	assert_eq!(*decoded.borrow(), value);
}

#[derive(Describe, Default, Debug, PartialEq)]
struct Empty {}

#[test]
fn empty_struct_round_trips() {
	let bytes = graphwire::to_native(&Empty {}).unwrap();
	let (decoded, _arena) = graphwire::from_native::<Empty>(&bytes).unwrap();
	assert_eq!(*decoded.borrow(), Empty {});
}

#[derive(Describe, Default, Debug, PartialEq)]
struct Base {
	#[graphwire(id = 1)]
	base_id: i32,
}

#[derive(Describe, Default, Debug, PartialEq)]
struct Derived {
	#[graphwire(positional)]
	base: Base,
	#[graphwire(id = 1)]
	extra: String,
}

#[test]
fn positional_base_field_round_trips() {
	let value = Derived { base: Base { base_id: 7 }, extra: "child".to_owned() };
	let bytes = graphwire::to_native(&value).unwrap();
	let (decoded, _arena) = graphwire::from_native::<Derived>(&bytes).unwrap();
	assert_eq!(*decoded.borrow(), value);
}

#[test]
fn unknown_identified_fields_are_skipped() {
	// A smaller descriptor reading a stream produced from a larger one
	// exercises the "unrecognized tag -> skip" path (spec §4.5.2,
	// backward-compatible reads).
	#[derive(Describe, Default)]
	struct Wide {
		#[graphwire(id = 1)]
		keep: i32,
		#[graphwire(id = 2)]
		drop_me: String,
		#[graphwire(id = 3)]
		also_drop: Vec<i32>,
	}
	#[derive(Describe, Default, Debug, PartialEq)]
	struct Narrow {
		#[graphwire(id = 1)]
		keep: i32,
	}

	let wide = Wide { keep: 42, drop_me: "ignored".to_owned(), also_drop: vec![1, 2, 3] };
	let bytes = graphwire::to_native(&wide).unwrap();
	let (decoded, _arena) = graphwire::from_native::<Narrow>(&bytes).unwrap();
	assert_eq!(*decoded.borrow(), Narrow { keep: 42 });
}
