//! Concrete streams over in-memory slices and `std::io` types, grounded on
//! the teacher's `SliceRead`/`ReaderRead` split: one implementation borrows a
//! slice directly, the other wraps any `Read`/`Write` behind a small scratch
//! buffer.

use super::{InputStream, OutputStream};
use crate::error::{ReadError, WriteError};

/// Reads from a borrowed byte slice with no copying.
pub struct SliceInput<'a> {
	slice: &'a [u8],
}

impl<'a> SliceInput<'a> {
	pub fn new(slice: &'a [u8]) -> Self {
		Self { slice }
	}

	pub fn remaining(&self) -> &'a [u8] {
		self.slice
	}
}

impl InputStream for SliceInput<'_> {
	fn is_eof(&mut self) -> bool {
		self.slice.is_empty()
	}

	fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
		let n = buf.len().min(self.slice.len());
		let (head, tail) = self.slice.split_at(n);
		buf[..n].copy_from_slice(head);
		self.slice = tail;
		Ok(n)
	}

	fn skip(&mut self, n: u64) -> Result<u64, ReadError> {
		let n = n.min(self.slice.len() as u64) as usize;
		self.slice = &self.slice[n..];
        Ok(n as u64)
	}

	fn length(&self) -> Option<u64> {
		Some(self.slice.len() as u64)
	}

	fn tell(&self) -> Option<u64> {
		None
	}

	fn seek(&mut self, _offset: u64) -> Result<(), ReadError> {
		Err(ReadError::custom("SliceInput does not track an absolute origin to seek from"))
	}
}

/// Reads from any `std::io::Read`, through a growable scratch buffer — the
/// same role the teacher's `ReaderRead::scratch` plays, but without the
/// borrowed-vs-owned `ReadVisitor` split, since this crate's codecs always
/// want owned bytes.
pub struct ReaderInput<R> {
	reader: R,
	max_read_size: usize,
	/// One byte of lookahead, used to answer `is_eof` without losing data —
	/// `std::io::Read` has no portable "peek".
	peeked: Option<u8>,
}

impl<R: std::io::Read> ReaderInput<R> {
	pub fn new(reader: R) -> Self {
		Self { reader, max_read_size: 512 * 1024 * 1024, peeked: None }
	}

	pub fn with_max_read_size(reader: R, max_read_size: usize) -> Self {
		Self { reader, max_read_size, peeked: None }
	}

	pub fn into_inner(self) -> R {
		self.reader
	}

	fn fill_peek(&mut self) {
		if self.peeked.is_none() {
			let mut probe = [0u8; 1];
			if std::io::Read::read(&mut self.reader, &mut probe).unwrap_or(0) == 1 {
				self.peeked = Some(probe[0]);
			}
		}
	}
}

impl<R: std::io::Read> InputStream for ReaderInput<R> {
	fn is_eof(&mut self) -> bool {
		self.fill_peek();
		self.peeked.is_none()
	}

	fn read(&mut self, buf: &mut [u8]) -> Result<usize, ReadError> {
		if buf.is_empty() {
			return Ok(0);
		}
		if buf.len() > self.max_read_size {
			return Err(ReadError::custom(format!(
				"requested read of {} bytes exceeds the configured maximum of {}",
				buf.len(),
				self.max_read_size
			)));
		}
		let mut written = 0;
		if let Some(byte) = self.peeked.take() {
			buf[0] = byte;
			written = 1;
		}
		if written < buf.len() {
			let more = std::io::Read::read(&mut self.reader, &mut buf[written..]).map_err(ReadError::io)?;
			written += more;
		}
		Ok(written)
	}
}

/// Writes into any `std::io::Write`.
pub struct WriterOutput<W> {
	writer: W,
}

impl<W: std::io::Write> WriterOutput<W> {
	pub fn new(writer: W) -> Self {
		Self { writer }
	}

	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: std::io::Write> OutputStream for WriterOutput<W> {
	fn write(&mut self, buf: &[u8]) -> Result<(), WriteError> {
		self.writer.write_all(buf).map_err(WriteError::io)
	}

	fn flush(&mut self) -> Result<(), WriteError> {
		std::io::Write::flush(&mut self.writer).map_err(WriteError::io)
	}
}

impl OutputStream for Vec<u8> {
	fn write(&mut self, buf: &[u8]) -> Result<(), WriteError> {
		self.extend_from_slice(buf);
		Ok(())
	}
}
