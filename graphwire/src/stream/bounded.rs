//! A byte-limit filter over a lower stream, grounded on `LeapSerial`'s
//! `BoundedStream` (spec §4.1, §12).

use super::{InputStream, OutputStream};
use crate::error::{ReadError, WriteError};

/// Enforces a read or write byte limit on an inner stream. Reading past the
/// limit behaves as end-of-stream rather than an error; writing past the
/// limit fails.
pub struct Bounded<S> {
	inner: S,
	limit: u64,
	used: u64,
}

impl<S> Bounded<S> {
	pub fn new(inner: S, limit: u64) -> Self {
		Self { inner, limit, used: 0 }
	}

	pub fn into_inner(self) -> S {
		self.inner
	}

	pub fn remaining(&self) -> u64 {
		self.limit.saturating_sub(self.used)
	}
}

impl<S: InputStream> InputStream for Bounded<S> {
	fn is_eof(&mut self) -> bool {
		self.remaining() == 0 || self.inner.is_eof()
	}

	fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
		let allowed = self.remaining().min(buf.len() as u64) as usize;
		if allowed == 0 {
			return Ok(0);
		}
		let n = self.inner.read(&mut buf[..allowed])?;
		self.used += n as u64;
		Ok(n)
	}

	fn length(&self) -> Option<u64> {
		Some(match self.inner.length() {
			Some(inner_len) => inner_len.min(self.limit),
			None => self.limit,
		})
	}

	fn tell(&self) -> Option<u64> {
		self.inner.tell()
	}

	fn clear(&mut self) {
		self.used = 0;
		self.inner.clear();
	}

	fn seek(&mut self, offset: u64) -> Result<(), ReadError> {
		self.inner.seek(offset)?;
		self.used = offset.min(self.limit);
		Ok(())
	}
}

impl<S: OutputStream> OutputStream for Bounded<S> {
	fn write(&mut self, buf: &[u8]) -> Result<(), WriteError> {
		if self.used + buf.len() as u64 > self.limit {
			return Err(WriteError::too_large(buf.len()));
		}
		self.inner.write(buf)?;
		self.used += buf.len() as u64;
		Ok(())
	}

	fn flush(&mut self) -> Result<(), WriteError> {
		self.inner.flush()
	}
}
