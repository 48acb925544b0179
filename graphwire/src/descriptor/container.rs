//! Field serializers for the composite value types spec §4.2 items 5-10:
//! growable and fixed-size arrays, ordered and hashed maps, byte-backed
//! strings, and `Duration`. Arrays and maps delegate to the
//! [`ArrayWrite`]/[`ArrayRead`]/[`DictWrite`]/[`DictRead`] adapters so the
//! same element/key/value serializer drives both codecs.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use super::FieldSerializer;
use crate::atom::Atom;
use crate::codec::{ArrayRead, ArrayWrite, DictRead, DictWrite, IArchive, OArchive};
use crate::error::{ReadError, WriteError};

struct VecArrayWrite<'a, T, S> {
	items: &'a [T],
	element: &'a S,
}

impl<T, S: FieldSerializer<T>> ArrayWrite for VecArrayWrite<'_, T, S> {
	fn len(&self) -> usize {
		self.items.len()
	}

	fn element_atom(&self) -> Atom {
		self.element.atom()
	}

	fn write_fixed_element(&self, archive: &mut dyn OArchive, index: usize) -> Result<(), WriteError> {
		self.element.write_fixed(archive, &self.items[index])
	}

	fn size_element(&self, archive: &mut dyn OArchive, index: usize) -> Result<u64, WriteError> {
		self.element.size(archive, &self.items[index])
	}

	fn write_element(&self, archive: &mut dyn OArchive, index: usize) -> Result<(), WriteError> {
		self.element.write(archive, &self.items[index])
	}
}

struct VecArrayRead<'a, T, S> {
	items: &'a mut Vec<T>,
	element: &'a S,
}

impl<T: Default, S: FieldSerializer<T>> ArrayRead for VecArrayRead<'_, T, S> {
	fn element_atom(&self) -> Atom {
		self.element.atom()
	}

	fn reserve(&mut self, n: usize) {
		self.items.reserve(n);
	}

	fn read_fixed_element(&mut self, archive: &mut dyn IArchive) -> Result<(), ReadError> {
		let mut value = T::default();
		self.element.read_fixed(archive, &mut value)?;
		self.items.push(value);
		Ok(())
	}

	fn read_element(&mut self, archive: &mut dyn IArchive, byte_budget: u64) -> Result<(), ReadError> {
		let mut value = T::default();
		self.element.read(archive, &mut value, byte_budget)?;
		self.items.push(value);
		Ok(())
	}
}

/// `Vec<T>` field serializer (spec §4.2 item 5/§4.5.1's array encoding). `T`
/// needs `Default` so a fresh slot can be read into before it's pushed (the
/// same pattern [`super::field::GetterSetterField`] uses).
pub struct VecField<T, S: FieldSerializer<T>> {
	element: S,
	_marker: PhantomData<T>,
}

impl<T, S: FieldSerializer<T>> VecField<T, S> {
	pub fn new(element: S) -> Self {
		Self { element, _marker: PhantomData }
	}
}

impl<T: Default, S: FieldSerializer<T>> FieldSerializer<Vec<T>> for VecField<T, S> {
	fn atom(&self) -> Atom {
		Atom::Array
	}

	fn allocates(&self) -> bool {
		true
	}

	fn size(&self, archive: &mut dyn OArchive, value: &Vec<T>) -> Result<u64, WriteError> {
		archive.size_array(&VecArrayWrite { items: value, element: &self.element })
	}

	fn write(&self, archive: &mut dyn OArchive, value: &Vec<T>) -> Result<(), WriteError> {
		archive.write_array(&VecArrayWrite { items: value, element: &self.element })
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut Vec<T>, byte_budget: u64) -> Result<(), ReadError> {
		archive.read_array(&mut VecArrayRead { items: value, element: &self.element }, byte_budget)
	}
}

/// Fixed-size `[T; N]` field serializer (spec §4.2 item 6): like [`VecField`]
/// but asserts the decoded element count equals `N` exactly
/// (`ReadError::size_mismatch`), since there is no slot to grow into. Assumes
/// the native codec's single-call, count-prefixed array encoding; Protobuf's
/// non-packed repeated tags call `read` once per element; a `[T; N]` field
/// under the Protobuf codec's descriptor rules is consequently rebuilt from
/// just the most recent occurrence rather than accumulated — use [`VecField`]
/// for any type meant to round-trip through both codecs.
pub struct FixedArrayField<T, S: FieldSerializer<T>, const N: usize> {
	element: S,
	_marker: PhantomData<T>,
}

impl<T, S: FieldSerializer<T>, const N: usize> FixedArrayField<T, S, N> {
	pub fn new(element: S) -> Self {
		Self { element, _marker: PhantomData }
	}
}

impl<T: Default + Copy, S: FieldSerializer<T>, const N: usize> FieldSerializer<[T; N]> for FixedArrayField<T, S, N> {
	fn atom(&self) -> Atom {
		Atom::Array
	}

	fn size(&self, archive: &mut dyn OArchive, value: &[T; N]) -> Result<u64, WriteError> {
		archive.size_array(&VecArrayWrite { items: value.as_slice(), element: &self.element })
	}

	fn write(&self, archive: &mut dyn OArchive, value: &[T; N]) -> Result<(), WriteError> {
		archive.write_array(&VecArrayWrite { items: value.as_slice(), element: &self.element })
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut [T; N], byte_budget: u64) -> Result<(), ReadError> {
		let mut scratch = Vec::with_capacity(N);
		archive.read_array(&mut VecArrayRead { items: &mut scratch, element: &self.element }, byte_budget)?;
		if scratch.len() != N {
			return Err(ReadError::size_mismatch(N, scratch.len()));
		}
		value.copy_from_slice(&scratch);
		Ok(())
	}
}

/// `String`/`Vec<u8>` field serializer (spec §4.2 item 9/10): both map to
/// [`Atom::String`], the catch-all length-delimited byte payload.
pub struct Utf8StringField;

impl FieldSerializer<String> for Utf8StringField {
	fn atom(&self) -> Atom {
		Atom::String
	}

	fn allocates(&self) -> bool {
		true
	}

	fn size(&self, archive: &mut dyn OArchive, value: &String) -> Result<u64, WriteError> {
		Ok(archive.size_string(value.len()))
	}

	fn write(&self, archive: &mut dyn OArchive, value: &String) -> Result<(), WriteError> {
		archive.write_string(value.as_bytes())
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut String, byte_budget: u64) -> Result<(), ReadError> {
		let bytes = archive.read_string(byte_budget)?;
		*value = String::from_utf8(bytes).map_err(|_| ReadError::custom("field bytes are not valid UTF-8"))?;
		Ok(())
	}
}

pub struct BytesField;

impl FieldSerializer<Vec<u8>> for BytesField {
	fn atom(&self) -> Atom {
		Atom::String
	}

	fn allocates(&self) -> bool {
		true
	}

	fn size(&self, archive: &mut dyn OArchive, value: &Vec<u8>) -> Result<u64, WriteError> {
		Ok(archive.size_string(value.len()))
	}

	fn write(&self, archive: &mut dyn OArchive, value: &Vec<u8>) -> Result<(), WriteError> {
		archive.write_string(value)
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut Vec<u8>, byte_budget: u64) -> Result<(), ReadError> {
		*value = archive.read_string(byte_budget)?;
		Ok(())
	}
}

struct MapDictWrite<'a, K, V, KS, VS> {
	entries: Vec<(&'a K, &'a V)>,
	key: &'a KS,
	value: &'a VS,
}

impl<K, V, KS: FieldSerializer<K>, VS: FieldSerializer<V>> DictWrite for MapDictWrite<'_, K, V, KS, VS> {
	fn len(&self) -> usize {
		self.entries.len()
	}

	fn key_atom(&self) -> Atom {
		self.key.atom()
	}

	fn value_atom(&self) -> Atom {
		self.value.atom()
	}

	fn size_key(&self, archive: &mut dyn OArchive, index: usize) -> Result<u64, WriteError> {
		self.key.size(archive, self.entries[index].0)
	}

	fn write_key(&self, archive: &mut dyn OArchive, index: usize) -> Result<(), WriteError> {
		self.key.write(archive, self.entries[index].0)
	}

	fn size_value(&self, archive: &mut dyn OArchive, index: usize) -> Result<u64, WriteError> {
		self.value.size(archive, self.entries[index].1)
	}

	fn write_value(&self, archive: &mut dyn OArchive, index: usize) -> Result<(), WriteError> {
		self.value.write(archive, self.entries[index].1)
	}
}

/// `BTreeMap<K, V>` field serializer (spec §4.2 item 8). `HashMap<K, V>`
/// below shares the same approach; both read through a single pending-key
/// scratch slot, the way [`DictRead`] is specified (key first, then the
/// value that gets inserted alongside it).
pub struct BTreeMapField<K, V, KS: FieldSerializer<K>, VS: FieldSerializer<V>> {
	key: KS,
	value: VS,
	_marker: PhantomData<(K, V)>,
}

impl<K, V, KS: FieldSerializer<K>, VS: FieldSerializer<V>> BTreeMapField<K, V, KS, VS> {
	pub fn new(key: KS, value: VS) -> Self {
		Self { key, value, _marker: PhantomData }
	}
}

struct BTreeMapDictRead<'a, K, V, KS, VS> {
	map: &'a mut BTreeMap<K, V>,
	key: &'a KS,
	value: &'a VS,
	pending_key: Option<K>,
}

impl<K: Ord + Default, V: Default, KS: FieldSerializer<K>, VS: FieldSerializer<V>> DictRead
	for BTreeMapDictRead<'_, K, V, KS, VS>
{
	fn key_atom(&self) -> Atom {
		self.key.atom()
	}

	fn value_atom(&self) -> Atom {
		self.value.atom()
	}

	fn read_key(&mut self, archive: &mut dyn IArchive, byte_budget: u64) -> Result<(), ReadError> {
		let mut k = K::default();
		self.key.read(archive, &mut k, byte_budget)?;
		self.pending_key = Some(k);
		Ok(())
	}

	fn read_value_and_insert(&mut self, archive: &mut dyn IArchive, byte_budget: u64) -> Result<(), ReadError> {
		let mut v = V::default();
		self.value.read(archive, &mut v, byte_budget)?;
		let k = self.pending_key.take().ok_or_else(|| ReadError::custom("map value read before its key"))?;
		self.map.insert(k, v);
		Ok(())
	}
}

impl<K: Ord + Default, V: Default, KS: FieldSerializer<K>, VS: FieldSerializer<V>> FieldSerializer<BTreeMap<K, V>>
	for BTreeMapField<K, V, KS, VS>
{
	fn atom(&self) -> Atom {
		Atom::Map
	}

	fn allocates(&self) -> bool {
		true
	}

	fn size(&self, archive: &mut dyn OArchive, value: &BTreeMap<K, V>) -> Result<u64, WriteError> {
		let entries: Vec<_> = value.iter().collect();
		archive.size_dictionary(&MapDictWrite { entries, key: &self.key, value: &self.value })
	}

	fn write(&self, archive: &mut dyn OArchive, value: &BTreeMap<K, V>) -> Result<(), WriteError> {
		let entries: Vec<_> = value.iter().collect();
		archive.write_dictionary(&MapDictWrite { entries, key: &self.key, value: &self.value })
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut BTreeMap<K, V>, byte_budget: u64) -> Result<(), ReadError> {
		archive.read_dictionary(
			&mut BTreeMapDictRead { map: value, key: &self.key, value: &self.value, pending_key: None },
			byte_budget,
		)
	}
}

/// `HashMap<K, V>` field serializer, identical in shape to [`BTreeMapField`]
/// save for the map type and its `Hash + Eq` bound instead of `Ord`.
pub struct HashMapField<K, V, KS: FieldSerializer<K>, VS: FieldSerializer<V>> {
	key: KS,
	value: VS,
	_marker: PhantomData<(K, V)>,
}

impl<K, V, KS: FieldSerializer<K>, VS: FieldSerializer<V>> HashMapField<K, V, KS, VS> {
	pub fn new(key: KS, value: VS) -> Self {
		Self { key, value, _marker: PhantomData }
	}
}

struct HashMapDictRead<'a, K, V, KS, VS> {
	map: &'a mut HashMap<K, V>,
	key: &'a KS,
	value: &'a VS,
	pending_key: Option<K>,
}

impl<K: Hash + Eq + Default, V: Default, KS: FieldSerializer<K>, VS: FieldSerializer<V>> DictRead
	for HashMapDictRead<'_, K, V, KS, VS>
{
	fn key_atom(&self) -> Atom {
		self.key.atom()
	}

	fn value_atom(&self) -> Atom {
		self.value.atom()
	}

	fn read_key(&mut self, archive: &mut dyn IArchive, byte_budget: u64) -> Result<(), ReadError> {
		let mut k = K::default();
		self.key.read(archive, &mut k, byte_budget)?;
		self.pending_key = Some(k);
		Ok(())
	}

	fn read_value_and_insert(&mut self, archive: &mut dyn IArchive, byte_budget: u64) -> Result<(), ReadError> {
		let mut v = V::default();
		self.value.read(archive, &mut v, byte_budget)?;
		let k = self.pending_key.take().ok_or_else(|| ReadError::custom("map value read before its key"))?;
		self.map.insert(k, v);
		Ok(())
	}
}

impl<K: Hash + Eq + Default, V: Default, KS: FieldSerializer<K>, VS: FieldSerializer<V>> FieldSerializer<HashMap<K, V>>
	for HashMapField<K, V, KS, VS>
{
	fn atom(&self) -> Atom {
		Atom::Map
	}

	fn allocates(&self) -> bool {
		true
	}

	fn size(&self, archive: &mut dyn OArchive, value: &HashMap<K, V>) -> Result<u64, WriteError> {
		let entries: Vec<_> = value.iter().collect();
		archive.size_dictionary(&MapDictWrite { entries, key: &self.key, value: &self.value })
	}

	fn write(&self, archive: &mut dyn OArchive, value: &HashMap<K, V>) -> Result<(), WriteError> {
		let entries: Vec<_> = value.iter().collect();
		archive.write_dictionary(&MapDictWrite { entries, key: &self.key, value: &self.value })
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut HashMap<K, V>, byte_budget: u64) -> Result<(), ReadError> {
		archive.read_dictionary(
			&mut HashMapDictRead { map: value, key: &self.key, value: &self.value, pending_key: None },
			byte_budget,
		)
	}
}

/// The fixed period a [`DurationField`] counts in (spec `SPEC_FULL.md` §11
/// supplement: "unit/period is a static property, never on the wire").
pub trait DurationPeriod {
	const NANOS_PER_UNIT: u64;
}

pub struct Nanoseconds;
impl DurationPeriod for Nanoseconds {
	const NANOS_PER_UNIT: u64 = 1;
}
pub struct Microseconds;
impl DurationPeriod for Microseconds {
	const NANOS_PER_UNIT: u64 = 1_000;
}
pub struct Milliseconds;
impl DurationPeriod for Milliseconds {
	const NANOS_PER_UNIT: u64 = 1_000_000;
}
pub struct Seconds;
impl DurationPeriod for Seconds {
	const NANOS_PER_UNIT: u64 = 1_000_000_000;
}

/// `std::time::Duration` field serializer (spec §4.2 item 4): the wire carries
/// a single `i64` tick count in period `P`; the period itself is chosen at
/// descriptor-build time and is never encoded.
pub struct DurationField<P: DurationPeriod> {
	_period: PhantomData<P>,
}

impl<P: DurationPeriod> DurationField<P> {
	pub fn new() -> Self {
		Self { _period: PhantomData }
	}
}

impl<P: DurationPeriod> Default for DurationField<P> {
	fn default() -> Self {
		Self::new()
	}
}

impl<P: DurationPeriod> FieldSerializer<Duration> for DurationField<P> {
	fn atom(&self) -> Atom {
		Atom::I64
	}

	fn size(&self, archive: &mut dyn OArchive, value: &Duration) -> Result<u64, WriteError> {
		Ok(archive.size_integer(duration_ticks::<P>(value), Atom::I64))
	}

	fn write(&self, archive: &mut dyn OArchive, value: &Duration) -> Result<(), WriteError> {
		archive.write_integer(duration_ticks::<P>(value), Atom::I64)
	}

	fn read(&self, archive: &mut dyn IArchive, value: &mut Duration, _byte_budget: u64) -> Result<(), ReadError> {
		let ticks = archive.read_integer(Atom::I64)?;
		let nanos = (ticks as i128) * (P::NANOS_PER_UNIT as i128);
		*value = Duration::from_nanos(nanos.max(0) as u64);
		Ok(())
	}
}

fn duration_ticks<P: DurationPeriod>(value: &Duration) -> i64 {
	(value.as_nanos() / P::NANOS_PER_UNIT as u128) as i64
}
