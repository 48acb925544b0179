//! Cyclic and aliased object graphs through the native codec's pointer
//! fields (spec §4.8). `Owning`/`Shared` collapse onto `Rc<RefCell<T>>`;
//! `Raw` onto `Weak<RefCell<T>>` — see `DESIGN.md`'s pointer-kind entry.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use graphwire::descriptor::pointer::{Owning, Raw, Shared};
use graphwire::descriptor::{DescriptorBuilder, Field};
use graphwire::{Describe, Descriptor};
use graphwire_derive::Describe as DeriveDescribe;

/// A doubly-linked node: `next` uniquely owns the rest of the chain, `prev`
/// is a non-owning back-reference — written by hand since the derive macro
/// doesn't infer `Owning` vs `Raw` from `Option`-less `Rc`/`Weak` fields
/// without a body to point them at yet.
#[derive(Default)]
struct Node {
	value: i32,
	next: Option<Rc<RefCell<Node>>>,
	prev: Weak<RefCell<Node>>,
}

impl Describe for Node {
	fn describe() -> Descriptor<Self> {
		DescriptorBuilder::new("Node")
			.identified(Box::new(Field::identified(
				1,
				"value",
				|n: &Node| &n.value,
				|n: &mut Node| &mut n.value,
				graphwire::descriptor::primitive::Primitive,
			)))
			.identified(Box::new(Field::identified(
				2,
				"next",
				|n: &Node| n.next.as_ref().expect("next always populated by these tests"),
				|n: &mut Node| n.next.get_or_insert_with(|| Rc::new(RefCell::new(Node::default()))),
				Owning::<Node>::new(),
			)))
			.identified(Box::new(Field::identified(
				3,
				"prev",
				|n: &Node| &n.prev,
				|n: &mut Node| &mut n.prev,
				Raw::<Node>::new(),
			)))
			.build()
	}
}

#[test]
fn cyclic_graph_round_trips_without_infinite_recursion() {
	let a = Rc::new(RefCell::new(Node { value: 1, next: None, prev: Weak::new() }));
	let b = Rc::new(RefCell::new(Node { value: 2, next: None, prev: Rc::downgrade(&a) }));
	a.borrow_mut().next = Some(Rc::clone(&b));
	b.borrow_mut().next = Some(Rc::clone(&a));

	let bytes = graphwire::to_native(&*a.borrow()).unwrap();
	let (decoded, _arena) = graphwire::from_native::<Node>(&bytes).unwrap();

	assert_eq!(decoded.borrow().value, 1);
	let next = Rc::clone(decoded.borrow().next.as_ref().unwrap());
	assert_eq!(next.borrow().value, 2);
	let back_to_a = next.borrow().prev.upgrade().expect("back-reference survives the round trip");
	assert_eq!(back_to_a.borrow().value, 1);
}

#[derive(DeriveDescribe, Default)]
struct Leaf {
	#[graphwire(id = 1)]
	tag: i32,
}

#[derive(DeriveDescribe, Default)]
struct SharedPair {
	#[graphwire(id = 1, shared)]
	first: Rc<RefCell<Leaf>>,
	#[graphwire(id = 2, shared)]
	second: Rc<RefCell<Leaf>>,
}

#[test]
fn shared_field_preserves_aliasing_on_read() {
	let shared_leaf = Rc::new(RefCell::new(Leaf { tag: 99 }));
	let value = SharedPair { first: Rc::clone(&shared_leaf), second: Rc::clone(&shared_leaf) };

	let bytes = graphwire::to_native(&value).unwrap();
	let (decoded, _arena) = graphwire::from_native::<SharedPair>(&bytes).unwrap();

	let decoded = decoded.borrow();
	assert_eq!(decoded.first.borrow().tag, 99);
	assert!(Rc::ptr_eq(&decoded.first, &decoded.second), "both fields should resolve to the same object id");
}

#[derive(DeriveDescribe, Default)]
struct OwningPair {
	#[graphwire(id = 1)]
	first: Rc<RefCell<Leaf>>,
	#[graphwire(id = 2)]
	second: Rc<RefCell<Leaf>>,
}

#[test]
fn aliasing_through_owning_fields_is_rejected_on_read() {
	let shared_leaf = Rc::new(RefCell::new(Leaf { tag: 1 }));
	let value = OwningPair { first: Rc::clone(&shared_leaf), second: Rc::clone(&shared_leaf) };

	let bytes = graphwire::to_native(&value).unwrap();
	let err = graphwire::from_native::<OwningPair>(&bytes).unwrap_err();
	assert_eq!(err.kind(), graphwire::ReadErrorKind::AliasViolation);
}
