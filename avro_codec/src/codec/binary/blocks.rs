//! Block-encoded `array`/`map` bodies (§4.3)
//!
//! One or more blocks, each a `long` item count followed by that many items;
//! a negative count means the block is immediately followed by a `long`
//! byte-size of the block (used so a reader that wants to skip the block can
//! do so without decoding every item) and the count to read is `-count`. A
//! block with count `0` terminates the sequence.

use super::{
	primitives::{read_long, write_long},
	reader::BinaryRead,
};
use crate::error::CodecError;
use std::io::Write;

/// Writes a sequence of items as a single block (no byte-size prefix — this
/// library never emits the negative-count form, matching the teacher's own
/// choice to only use it for skip-friendliness on the read side)
pub fn write_block<W: Write, T>(
	w: &mut W,
	items: &[T],
	mut write_item: impl FnMut(&mut W, &T) -> Result<(), CodecError>,
) -> Result<(), CodecError> {
	if !items.is_empty() {
		write_long(w, items.len() as i64)?;
		for item in items {
			write_item(w, item)?;
		}
	}
	write_long(w, 0)?;
	Ok(())
}

/// Reads every item across however many blocks the encoder chose to use,
/// calling `read_item` once per item.
pub fn read_blocks<R: BinaryRead, T>(
	r: &mut R,
	mut read_item: impl FnMut(&mut R) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
	let mut items = Vec::new();
	loop {
		let count = read_long(r)?;
		if count == 0 {
			break;
		}
		let count = if count < 0 {
			let _byte_size = read_long(r)?;
			(-count) as usize
		} else {
			count as usize
		};
		items.reserve(count);
		for _ in 0..count {
			items.push(read_item(r)?);
		}
	}
	Ok(items)
}

/// Drives a block sequence one item at a time, for `serde::de::SeqAccess`/
/// `MapAccess` implementations that pull items lazily rather than collecting
/// them all up front like [`read_blocks`] does.
pub struct BlockCursor {
	remaining: i64,
}

impl BlockCursor {
	pub fn new() -> Self {
		Self { remaining: 0 }
	}

	/// Returns whether another item follows, reading the next block's count
	/// header (and discarding its byte-size prefix, if present) when the
	/// current block is exhausted.
	pub fn has_next<R: BinaryRead>(&mut self, r: &mut R) -> Result<bool, CodecError> {
		if self.remaining == 0 {
			let count = read_long(r)?;
			if count == 0 {
				return Ok(false);
			}
			self.remaining = if count < 0 {
				let _byte_size = read_long(r)?;
				-count
			} else {
				count
			};
		}
		Ok(true)
	}

	/// Records that the item just made available by [`Self::has_next`] has
	/// been consumed.
	pub fn consume(&mut self) {
		self.remaining -= 1;
	}
}

/// Skips every item across however many blocks the encoder chose to use,
/// without materializing them.
pub fn skip_blocks<R: BinaryRead>(
	r: &mut R,
	mut skip_item: impl FnMut(&mut R) -> Result<(), CodecError>,
) -> Result<(), CodecError> {
	loop {
		let count = read_long(r)?;
		if count == 0 {
			break;
		}
		let count = if count < 0 {
			let _byte_size = read_long(r)?;
			(-count) as usize
		} else {
			count as usize
		};
		for _ in 0..count {
			skip_item(r)?;
		}
	}
	Ok(())
}
