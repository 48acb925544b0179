//! Byte-oriented input/output streams, independent of the archive layer above
//! them. Every codec in this crate is written against [`InputStream`] and
//! [`OutputStream`] rather than against `std::io` directly, so that the same
//! codec logic runs over slices, files, or a filter chain.

mod bounded;
mod buffered;
mod memory;

pub use bounded::Bounded;
pub use buffered::Buffered;
pub use memory::{ReaderInput, SliceInput, WriterOutput};

use crate::error::{ReadError, WriteError};

/// A sequential source of bytes with optional random access.
///
/// Implementations are free to return short reads for any reason; only a
/// short read at end-of-stream is well-defined, and callers must keep asking
/// until [`is_eof`](InputStream::is_eof) returns `true`.
pub trait InputStream {
	/// Whether the stream has no more bytes to offer.
	fn is_eof(&mut self) -> bool;

	/// Reads up to `buf.len()` bytes, returning the number read.
	fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError>;

	/// Discards up to `n` bytes, returning the number actually skipped.
	fn skip(&mut self, n: u64) -> Result<u64, ReadError> {
		let mut remaining = n;
		let mut scratch = [0u8; 4096];
		while remaining > 0 {
			let chunk = remaining.min(scratch.len() as u64) as usize;
			let read = self.read(&mut scratch[..chunk])?;
			if read == 0 {
				break;
			}
			remaining -= read as u64;
		}
		Ok(n - remaining)
	}

	/// The total length of the stream, if known.
	fn length(&self) -> Option<u64> {
		None
	}

	/// The current read position, if the stream tracks one.
	fn tell(&self) -> Option<u64> {
		None
	}

	/// Resets any internal cursor to the start, if supported.
	fn clear(&mut self) {}

	/// Moves the read cursor to an absolute offset. The default
	/// implementation reports the operation as unsupported.
	fn seek(&mut self, _offset: u64) -> Result<(), ReadError> {
		Err(ReadError::custom("this stream does not support seeking"))
	}

	/// Reads exactly `buf.len()` bytes or fails with
	/// [`ReadErrorKind::UnexpectedEof`](crate::error::ReadErrorKind::UnexpectedEof).
	fn read_exact(&mut self, mut buf: &mut [u8]) -> Result<(), ReadError> {
		while !buf.is_empty() {
			let n = self.read(buf)?;
			if n == 0 {
				return Err(ReadError::unexpected_eof());
			}
			buf = &mut buf[n..];
		}
		Ok(())
	}
}

/// A sequential sink for bytes.
///
/// Per spec §4.1, [`write`](OutputStream::write) has all-or-nothing
/// semantics: either every byte is accepted or the call fails outright.
pub trait OutputStream {
	fn write(&mut self, buf: &[u8]) -> Result<(), WriteError>;

	fn flush(&mut self) -> Result<(), WriteError> {
		Ok(())
	}

	/// Transfers bytes from `from` into `self` through `scratch`, stopping
	/// after `max_bytes` have moved, or — when `max_bytes` is negative —
	/// running until `from` reports end-of-stream.
	fn transfer(
		&mut self,
		from: &mut dyn InputStream,
		scratch: &mut [u8],
		max_bytes: i64,
	) -> Result<TransferOutcome, WriteError> {
		if scratch.is_empty() {
			return Err(WriteError::custom("transfer scratch buffer must be non-empty"));
		}
		let mut moved: u64 = 0;
		let until_eof = max_bytes < 0;
		let budget = if until_eof { u64::MAX } else { max_bytes as u64 };
		loop {
			if !until_eof && moved >= budget {
				return Ok(TransferOutcome::Ok);
			}
			let chunk = if until_eof {
				scratch.len()
			} else {
				scratch.len().min((budget - moved) as usize)
			};
			let read = match from.read(&mut scratch[..chunk]) {
				Ok(n) => n,
				Err(_) => return Ok(TransferOutcome::InputError),
			};
			if read == 0 {
				if from.is_eof() {
					return Ok(TransferOutcome::InputEof);
				}
				return Ok(TransferOutcome::InputError);
			}
			self.write(&scratch[..read])?;
			moved += read as u64;
		}
	}
}

/// The result of [`OutputStream::transfer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
	Ok,
	InputEof,
	InputError,
}

/// The contract a filter stream (compression, encryption, ...) must satisfy
/// to compose with [`InputStream`]/[`OutputStream`]. Concrete filter bodies
/// (AES, compression) are out of scope here; only the shape is specified so
/// that collaborators can plug into it (spec §1, §4.1).
pub trait FilterStream {
	/// Consumes a prefix of `input`, producing a prefix of `output`.
	/// `in_used`/`out_used` report how much of each buffer the call
	/// consumed/produced; forward progress (either `in_used > 0` or
	/// `out_used > 0`) is required unless `flush` is set and the filter has
	/// genuinely drained its internal state.
	fn transform(
		&mut self,
		input: &[u8],
		in_used: &mut usize,
		output: &mut [u8],
		out_used: &mut usize,
		flush: bool,
	) -> Result<(), WriteError>;
}
