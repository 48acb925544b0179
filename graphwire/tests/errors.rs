//! Direct assertions on error kinds (spec §4.8's object-id cap, §4.2's fixed
//! array size invariant, and plain stream exhaustion).

use std::cell::RefCell;
use std::rc::Rc;

use graphwire::descriptor::pointer::Owning;
use graphwire::descriptor::{DescriptorBuilder, Field};
use graphwire::stream::SliceInput;
use graphwire::{Describe, Descriptor, NativeReader, ReadErrorKind};
use graphwire_derive::Describe as DeriveDescribe;

#[derive(Default)]
struct Chain {
	value: i32,
	next: Option<Rc<RefCell<Chain>>>,
}

impl Describe for Chain {
	fn describe() -> Descriptor<Self> {
		DescriptorBuilder::new("Chain")
			.identified(Box::new(Field::identified(
				1,
				"value",
				|c: &Chain| &c.value,
				|c: &mut Chain| &mut c.value,
				graphwire::descriptor::primitive::Primitive,
			)))
			.identified(Box::new(Field::identified(
				2,
				"next",
				|c: &Chain| c.next.as_ref().expect("next always populated by these tests"),
				|c: &mut Chain| c.next.get_or_insert_with(|| Rc::new(RefCell::new(Chain::default()))),
				Owning::<Chain>::new(),
			)))
			.build()
	}
}

#[test]
fn exceeding_the_object_cap_fails_with_too_many_objects() {
	// root -> node1 -> node2 -> node3 -> node4 -> (self-loop), four distinct
	// referenced object ids, well past a cap of two.
	let node4 = Rc::new(RefCell::new(Chain { value: 4, next: None }));
	node4.borrow_mut().next = Some(Rc::clone(&node4));
	let node3 = Rc::new(RefCell::new(Chain { value: 3, next: Some(Rc::clone(&node4)) }));
	let node2 = Rc::new(RefCell::new(Chain { value: 2, next: Some(Rc::clone(&node3)) }));
	let node1 = Rc::new(RefCell::new(Chain { value: 1, next: Some(Rc::clone(&node2)) }));
	let root = Chain { value: 0, next: Some(node1) };

	let bytes = graphwire::to_native(&root).unwrap();

	let mut input = SliceInput::new(&bytes);
	let reader = NativeReader::with_max_objects(&mut input, 2);
	let err = reader.read_root::<Chain>().unwrap_err();
	assert_eq!(err.kind(), ReadErrorKind::TooManyObjects);
}

#[derive(DeriveDescribe, Default, Debug, PartialEq)]
struct ThreeInts {
	#[graphwire(id = 1)]
	values: [i32; 3],
}

#[test]
fn fixed_array_field_rejects_a_mismatched_element_count() {
	#[derive(DeriveDescribe, Default)]
	struct FourInts {
		#[graphwire(id = 1)]
		values: Vec<i32>,
	}
	let wrong = FourInts { values: vec![1, 2, 3, 4] };
	let bytes = graphwire::to_native(&wrong).unwrap();

	let err = graphwire::from_native::<ThreeInts>(&bytes).unwrap_err();
	assert_eq!(err.kind(), ReadErrorKind::SizeMismatch);
}

#[test]
fn truncated_stream_fails_with_unexpected_eof() {
	let value = ThreeInts { values: [1, 2, 3] };
	let bytes = graphwire::to_native(&value).unwrap();
	let truncated = &bytes[..bytes.len() - 1];

	let err = graphwire::from_native::<ThreeInts>(truncated).unwrap_err();
	assert_eq!(err.kind(), ReadErrorKind::UnexpectedEof);
}
