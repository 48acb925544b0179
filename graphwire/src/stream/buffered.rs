//! A fixed-capacity ring buffer over a lower stream, named directly in spec
//! §4.1 ("buffered and bounded streams are concrete helpers") and grounded on
//! `LeapSerial`'s `BufferedStream` (see `examples/original_source/_INDEX.md`).

use super::{InputStream, OutputStream};
use crate::error::{ReadError, WriteError};

/// Buffers reads from an inner stream in fixed-size chunks, and buffers
/// writes to an inner stream the same way, flushing whole chunks at a time.
/// Supports seeking within the bytes currently held in the ring.
pub struct Buffered<S> {
	inner: S,
	ring: Vec<u8>,
	start: usize,
	len: usize,
	capacity: usize,
}

impl<S> Buffered<S> {
	pub fn new(inner: S, capacity: usize) -> Self {
		assert!(capacity > 0, "Buffered stream capacity must be non-zero");
		Self { inner, ring: vec![0u8; capacity], start: 0, len: 0, capacity }
	}

	pub fn into_inner(self) -> S {
		self.inner
	}

	fn buffered_slice(&self) -> (&[u8], &[u8]) {
		if self.start + self.len <= self.capacity {
			(&self.ring[self.start..self.start + self.len], &[])
		} else {
			let first = self.capacity - self.start;
			(&self.ring[self.start..], &self.ring[..self.len - first])
		}
	}

	fn drop_front(&mut self, n: usize) {
		let n = n.min(self.len);
		self.start = (self.start + n) % self.capacity;
		self.len -= n;
	}
}

impl<S: InputStream> Buffered<S> {
	fn fill(&mut self) -> Result<(), ReadError> {
		while self.len < self.capacity {
			let end = (self.start + self.len) % self.capacity;
			let run = if end >= self.start { self.capacity - end } else { self.start - end };
			let run = run.min(self.capacity - self.len);
			if run == 0 {
				break;
			}
			let n = self.inner.read(&mut self.ring[end..end + run])?;
			if n == 0 {
				break;
			}
			self.len += n;
		}
		Ok(())
	}
}

impl<S: InputStream> InputStream for Buffered<S> {
	fn is_eof(&mut self) -> bool {
		if self.len > 0 {
			return false;
		}
		let _ = self.fill();
		self.len == 0 && self.inner.is_eof()
	}

	fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
		if self.len == 0 {
			self.fill()?;
		}
		if self.len == 0 {
			return Ok(0);
		}
		let (a, b) = self.buffered_slice();
		let mut written = 0;
		for part in [a, b] {
			if written >= buf.len() {
				break;
			}
			let n = part.len().min(buf.len() - written);
			buf[written..written + n].copy_from_slice(&part[..n]);
			written += n;
		}
		self.drop_front(written);
		Ok(written)
	}

	fn length(&self) -> Option<u64> {
		self.inner.length()
	}

	fn tell(&self) -> Option<u64> {
		self.inner.tell().map(|t| t - self.len as u64)
	}

	fn clear(&mut self) {
		self.start = 0;
		self.len = 0;
		self.inner.clear();
	}

	fn seek(&mut self, offset: u64) -> Result<(), ReadError> {
		self.start = 0;
		self.len = 0;
		self.inner.seek(offset)
	}
}

impl<S: OutputStream> Buffered<S> {
	fn drain(&mut self) -> Result<(), WriteError> {
		if self.len == 0 {
			return Ok(());
		}
		let (start, len, capacity) = (self.start, self.len, self.capacity);
		if start + len <= capacity {
			self.inner.write(&self.ring[start..start + len])?;
		} else {
			let first = capacity - start;
			self.inner.write(&self.ring[start..])?;
			self.inner.write(&self.ring[..len - first])?;
		}
		self.start = 0;
		self.len = 0;
		Ok(())
	}
}

impl<S: OutputStream> OutputStream for Buffered<S> {
	fn write(&mut self, mut buf: &[u8]) -> Result<(), WriteError> {
		while !buf.is_empty() {
			if self.len == self.capacity {
				self.drain()?;
			}
			let end = (self.start + self.len) % self.capacity;
			let run = if end >= self.start {
				self.capacity - end
			} else {
				self.start - end
			};
			let n = run.min(buf.len()).min(self.capacity - self.len);
			if n == 0 {
				self.drain()?;
				continue;
			}
			self.ring[end..end + n].copy_from_slice(&buf[..n]);
			self.len += n;
			buf = &buf[n..];
		}
		Ok(())
	}

	fn flush(&mut self) -> Result<(), WriteError> {
		self.drain()?;
		self.inner.flush()
	}
}
