//! Abstracts reading from a slice (propagating borrows) or from any other
//! `impl BufRead`, behind one interface, so the compiled decoders (§4.2) are
//! generic over where the bytes come from.

use crate::error::{CodecError, ErrorLocation};
use integer_encoding::{VarInt, VarIntReader};

/// Reads Avro binary primitives from an underlying byte source
///
/// The compiled decoder closures (§4.2, component C) are generic over this
/// trait rather than over a concrete reader type.
pub trait BinaryRead: std::io::Read + private::Sealed {
	/// Read a zig-zag variable-length-encoded integer
	fn read_varint<I: VarInt>(&mut self) -> Result<I, CodecError>;

	/// Read exactly `N` bytes into a stack array — convenience for `fixed`
	/// and logical types with a statically known size (e.g. `duration`).
	fn read_const_size_buf<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
		let mut buf = [0u8; N];
		self.read_exact(&mut buf)
			.map_err(|e| CodecError::invalid_data(ErrorLocation::Unknown, e.to_string()))?;
		Ok(buf)
	}

	/// Current byte offset from the start of the payload, if known (used to
	/// build [`ErrorLocation::ByteOffset`])
	fn byte_offset(&self) -> Option<usize> {
		None
	}
}

/// A [`BinaryRead`] that can additionally hand out borrowed slices without
/// copying, when reading from a slice in memory.
pub trait BinaryReadSlice<'de>: BinaryRead {
	fn read_slice<V: SliceVisitor<'de>>(&mut self, n: usize, visitor: V) -> Result<V::Value, CodecError>;
}

mod private {
	pub trait Sealed {}
}

/// Reads Avro binary from an in-memory `&[u8]`, producing borrowed strings
/// and byte slices where possible.
pub struct SliceReader<'de> {
	slice: &'de [u8],
	consumed: usize,
}

impl<'de> SliceReader<'de> {
	pub fn new(slice: &'de [u8]) -> Self {
		Self { slice, consumed: 0 }
	}
	pub fn remaining(&self) -> &'de [u8] {
		self.slice
	}
}

impl private::Sealed for SliceReader<'_> {}

impl std::io::Read for SliceReader<'_> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		let n = self.slice.read(buf)?;
		self.consumed += n;
		Ok(n)
	}
}

impl BinaryRead for SliceReader<'_> {
	fn read_varint<I: VarInt>(&mut self) -> Result<I, CodecError> {
		match I::decode_var(self.slice) {
			None => Err(CodecError::invalid_data(
				ErrorLocation::ByteOffset(self.consumed),
				"reached end of input while decoding a varint",
			)),
			Some((val, read)) => {
				self.slice = &self.slice[read..];
				self.consumed += read;
				Ok(val)
			}
		}
	}
	fn byte_offset(&self) -> Option<usize> {
		Some(self.consumed)
	}
}

impl<'de> BinaryReadSlice<'de> for SliceReader<'de> {
	fn read_slice<V: SliceVisitor<'de>>(&mut self, n: usize, visitor: V) -> Result<V::Value, CodecError> {
		if n > self.slice.len() {
			return Err(CodecError::invalid_data(
				ErrorLocation::ByteOffset(self.consumed),
				"unexpected end of input",
			));
		}
		let (just_read, rest) = self.slice.split_at(n);
		self.slice = rest;
		self.consumed += n;
		visitor.visit_borrowed(just_read)
	}
}

/// Reads Avro binary from any `impl std::io::Read`, copying into scratch
/// buffers as needed (no borrowed output is possible from a non-slice
/// source).
pub struct IoReader<R> {
	reader: R,
	consumed: usize,
	scratch: Vec<u8>,
	/// Safeguard against malformed length prefixes driving huge allocations
	pub max_alloc_size: usize,
}

impl<R: std::io::Read> IoReader<R> {
	pub fn new(reader: R) -> Self {
		Self {
			reader,
			consumed: 0,
			scratch: Vec::new(),
			max_alloc_size: 512 * 1024 * 1024,
		}
	}
	pub fn into_inner(self) -> R {
		self.reader
	}
}

impl<R: std::io::Read> private::Sealed for IoReader<R> {}

impl<R: std::io::Read> std::io::Read for IoReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		let n = self.reader.read(buf)?;
		self.consumed += n;
		Ok(n)
	}
}

impl<R: std::io::Read> BinaryRead for IoReader<R> {
	fn read_varint<I: VarInt>(&mut self) -> Result<I, CodecError> {
		let (val, read) = <Self as VarIntReader>::read_varint(self)
			.map(|v| (v, 0usize))
			.map_err(|e| CodecError::invalid_data(ErrorLocation::ByteOffset(self.consumed), e.to_string()))?;
		let _ = read;
		Ok(val)
	}
	fn byte_offset(&self) -> Option<usize> {
		Some(self.consumed)
	}
}

impl<'de, R: std::io::Read> BinaryReadSlice<'de> for IoReader<R> {
	fn read_slice<V: SliceVisitor<'de>>(&mut self, n: usize, visitor: V) -> Result<V::Value, CodecError> {
		if n > self.max_alloc_size {
			return Err(CodecError::invalid_data(
				ErrorLocation::ByteOffset(self.consumed),
				format!(
					"allocation of {n} bytes exceeds max_alloc_size ({})",
					self.max_alloc_size
				),
			));
		}
		if self.scratch.len() < n {
			self.scratch.resize(n, 0);
		}
		self.reader
			.read_exact(&mut self.scratch[..n])
			.map_err(|e| CodecError::invalid_data(ErrorLocation::ByteOffset(self.consumed), e.to_string()))?;
		self.consumed += n;
		visitor.visit(&self.scratch[..n])
	}
}

/// Turns a short-lived byte slice into an owned or borrowed value; mirrors
/// the teacher's `ReadVisitor` trick so [`BinaryReadSlice::read_slice`] can
/// avoid an intermediate allocation when reading from a [`SliceReader`].
pub trait SliceVisitor<'de>: Sized {
	type Value;
	fn visit(self, bytes: &[u8]) -> Result<Self::Value, CodecError>;
	fn visit_borrowed(self, bytes: &'de [u8]) -> Result<Self::Value, CodecError> {
		self.visit(bytes)
	}
}

impl<'de, F, V> SliceVisitor<'de> for F
where
	F: FnOnce(&[u8]) -> Result<V, CodecError>,
{
	type Value = V;
	fn visit(self, bytes: &[u8]) -> Result<Self::Value, CodecError> {
		self(bytes)
	}
}
