use std::borrow::Cow;

/// Coarse-grained error category, stable across versions, for callers and tests
/// that need to `match` on *why* an archive operation failed rather than parse
/// [`Display`](std::fmt::Display) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReadErrorKind {
	StreamIo,
	UnexpectedEof,
	InvalidTag,
	FramingMismatch,
	AliasViolation,
	SizeMismatch,
	SerializerMissing,
	TooManyObjects,
	Custom,
}

/// Any error that may happen while reading an archive
#[derive(thiserror::Error)]
#[error("{inner}")]
pub struct ReadError {
	inner: Box<ReadErrorInner>,
}

enum ReadErrorInner {
	StreamIo(std::io::Error),
	UnexpectedEof,
	InvalidTag { byte: u8 },
	FramingMismatch { consumed: u64, budget: u64 },
	AliasViolation { id: u32 },
	SizeMismatch { expected: usize, found: usize },
	SerializerMissing { type_name: &'static str },
	TooManyObjects { limit: u32 },
	Custom(Cow<'static, str>),
}

impl std::fmt::Display for ReadErrorInner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ReadErrorInner::StreamIo(e) => write!(f, "stream I/O error while reading: {e}"),
			ReadErrorInner::UnexpectedEof => {
				write!(f, "unexpected end of stream before the required byte count")
			}
			ReadErrorInner::InvalidTag { byte } => {
				write!(f, "tag byte 0x{byte:02x} decoded to a wire kind not expected in this context")
			}
			ReadErrorInner::FramingMismatch { consumed, budget } => write!(
				f,
				"descriptor read consumed {consumed} bytes against a budget of {budget}"
			),
			ReadErrorInner::AliasViolation { id } => write!(
				f,
				"object id {id} was read through a unique pointer more than once"
			),
			ReadErrorInner::SizeMismatch { expected, found } => write!(
				f,
				"fixed-size array expected {expected} elements, found {found}"
			),
			ReadErrorInner::SerializerMissing { type_name } => {
				write!(f, "no descriptor registered for `{type_name}`")
			}
			ReadErrorInner::TooManyObjects { limit } => {
				write!(f, "read-side object registry exceeded its limit of {limit} ids")
			}
			ReadErrorInner::Custom(msg) => write!(f, "{msg}"),
		}
	}
}

impl std::fmt::Debug for ReadError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &*self.inner {
			ReadErrorInner::StreamIo(e) => write!(f, "{}: {e:?}", self.inner),
			other => std::fmt::Display::fmt(other, f),
		}
	}
}

impl ReadError {
	pub(crate) fn io(e: std::io::Error) -> Self {
		Self { inner: Box::new(ReadErrorInner::StreamIo(e)) }
	}
	pub(crate) fn unexpected_eof() -> Self {
		Self { inner: Box::new(ReadErrorInner::UnexpectedEof) }
	}
	pub(crate) fn invalid_tag(byte: u8) -> Self {
		Self { inner: Box::new(ReadErrorInner::InvalidTag { byte }) }
	}
	pub(crate) fn framing_mismatch(consumed: u64, budget: u64) -> Self {
		Self { inner: Box::new(ReadErrorInner::FramingMismatch { consumed, budget }) }
	}
	pub(crate) fn alias_violation(id: u32) -> Self {
		Self { inner: Box::new(ReadErrorInner::AliasViolation { id }) }
	}
	pub(crate) fn size_mismatch(expected: usize, found: usize) -> Self {
		Self { inner: Box::new(ReadErrorInner::SizeMismatch { expected, found }) }
	}
	pub(crate) fn serializer_missing(type_name: &'static str) -> Self {
		Self { inner: Box::new(ReadErrorInner::SerializerMissing { type_name }) }
	}
	pub(crate) fn too_many_objects(limit: u32) -> Self {
		Self { inner: Box::new(ReadErrorInner::TooManyObjects { limit }) }
	}
	pub fn custom(msg: impl Into<Cow<'static, str>>) -> Self {
		Self { inner: Box::new(ReadErrorInner::Custom(msg.into())) }
	}

	/// The underlying I/O error, if this failure originated at the stream layer
	pub fn io_error(&self) -> Option<&std::io::Error> {
		match &*self.inner {
			ReadErrorInner::StreamIo(e) => Some(e),
			_ => None,
		}
	}

	pub fn kind(&self) -> ReadErrorKind {
		match &*self.inner {
			ReadErrorInner::StreamIo(_) => ReadErrorKind::StreamIo,
			ReadErrorInner::UnexpectedEof => ReadErrorKind::UnexpectedEof,
			ReadErrorInner::InvalidTag { .. } => ReadErrorKind::InvalidTag,
			ReadErrorInner::FramingMismatch { .. } => ReadErrorKind::FramingMismatch,
			ReadErrorInner::AliasViolation { .. } => ReadErrorKind::AliasViolation,
			ReadErrorInner::SizeMismatch { .. } => ReadErrorKind::SizeMismatch,
			ReadErrorInner::SerializerMissing { .. } => ReadErrorKind::SerializerMissing,
			ReadErrorInner::TooManyObjects { .. } => ReadErrorKind::TooManyObjects,
			ReadErrorInner::Custom(_) => ReadErrorKind::Custom,
		}
	}
}

/// Coarse-grained error category for write-side failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum WriteErrorKind {
	StreamIo,
	ProtobufIncompat,
	TooLarge,
	SerializerMissing,
	Custom,
}

/// Any error that may happen while writing an archive
#[derive(thiserror::Error)]
#[error("{inner}")]
pub struct WriteError {
	inner: Box<WriteErrorInner>,
}

enum WriteErrorInner {
	StreamIo(std::io::Error),
	ProtobufIncompat { type_name: &'static str },
	TooLarge { len: usize },
	SerializerMissing { type_name: &'static str },
	Custom(Cow<'static, str>),
}

impl std::fmt::Display for WriteErrorInner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			WriteErrorInner::StreamIo(e) => write!(f, "stream I/O error while writing: {e}"),
			WriteErrorInner::ProtobufIncompat { type_name } => write!(
				f,
				"`{type_name}` has positional fields, which the Protobuf codec cannot represent"
			),
			WriteErrorInner::TooLarge { len } => write!(
				f,
				"array of {len} elements exceeds the 2^31-1 element limit of the fixed-wire format"
			),
			WriteErrorInner::SerializerMissing { type_name } => {
				write!(f, "no descriptor registered for `{type_name}`")
			}
			WriteErrorInner::Custom(msg) => write!(f, "{msg}"),
		}
	}
}

impl std::fmt::Debug for WriteError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &*self.inner {
			WriteErrorInner::StreamIo(e) => write!(f, "{}: {e:?}", self.inner),
			other => std::fmt::Display::fmt(other, f),
		}
	}
}

impl WriteError {
	pub(crate) fn io(e: std::io::Error) -> Self {
		Self { inner: Box::new(WriteErrorInner::StreamIo(e)) }
	}
	pub(crate) fn protobuf_incompat(type_name: &'static str) -> Self {
		Self { inner: Box::new(WriteErrorInner::ProtobufIncompat { type_name }) }
	}
	pub(crate) fn too_large(len: usize) -> Self {
		Self { inner: Box::new(WriteErrorInner::TooLarge { len }) }
	}
	pub(crate) fn serializer_missing(type_name: &'static str) -> Self {
		Self { inner: Box::new(WriteErrorInner::SerializerMissing { type_name }) }
	}
	pub fn custom(msg: impl Into<Cow<'static, str>>) -> Self {
		Self { inner: Box::new(WriteErrorInner::Custom(msg.into())) }
	}

	pub fn io_error(&self) -> Option<&std::io::Error> {
		match &*self.inner {
			WriteErrorInner::StreamIo(e) => Some(e),
			_ => None,
		}
	}

	pub fn kind(&self) -> WriteErrorKind {
		match &*self.inner {
			WriteErrorInner::StreamIo(_) => WriteErrorKind::StreamIo,
			WriteErrorInner::ProtobufIncompat { .. } => WriteErrorKind::ProtobufIncompat,
			WriteErrorInner::TooLarge { .. } => WriteErrorKind::TooLarge,
			WriteErrorInner::SerializerMissing { .. } => WriteErrorKind::SerializerMissing,
			WriteErrorInner::Custom(_) => WriteErrorKind::Custom,
		}
	}
}
