//! Binary encoding of the `decimal` logical type (§4.2.3 item 12, §4.7, §8
//! property 6, scenario E6)
//!
//! The unscaled value is a two's-complement big-endian integer; encoding
//! truncates toward zero when the value's scale exceeds the schema's, and
//! raises [`CodecError::Overflow`] when the truncated value would need more
//! digits than the schema's `precision` allows.

use super::primitives::{read_length, write_long};
use super::reader::{BinaryReadSlice, BinaryRead};
use crate::error::{CodecError, ErrorLocation};
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::Write;

/// Where the unscaled integer's bytes live on the wire
#[derive(Clone, Copy)]
pub enum Repr {
	/// Length-prefixed, like `bytes`
	Bytes,
	/// Exactly `size` bytes, no prefix, like `fixed`
	Fixed { size: usize },
}

pub fn encode(
	w: &mut impl Write,
	repr: Repr,
	precision: usize,
	scale: u32,
	mut value: Decimal,
) -> Result<(), CodecError> {
	value = value.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
	value.rescale(scale);
	let unscaled = value.mantissa();
	if digit_count(unscaled) > precision {
		return Err(CodecError::overflow(
			ErrorLocation::Unknown,
			format!(
				"decimal {value} needs more than {precision} digits of precision at scale {scale}"
			),
		));
	}
	let full_be = unscaled.to_be_bytes();
	let minimal = minimal_twos_complement(&full_be);
	match repr {
		Repr::Bytes => {
			write_long(w, minimal.len() as i64)?;
			w.write_all(minimal)?;
		}
		Repr::Fixed { size } => {
			if minimal.len() > size {
				return Err(CodecError::overflow(
					ErrorLocation::Unknown,
					format!("decimal unscaled value needs {} bytes but fixed size is {size}", minimal.len()),
				));
			}
			let pad_byte = if unscaled.is_negative() { 0xFF } else { 0x00 };
			for _ in 0..(size - minimal.len()) {
				w.write_all(&[pad_byte])?;
			}
			w.write_all(minimal)?;
		}
	}
	Ok(())
}

pub fn decode<'de>(
	r: &mut impl BinaryReadSlice<'de>,
	repr: Repr,
	scale: u32,
) -> Result<Decimal, CodecError> {
	let bytes = match repr {
		Repr::Bytes => {
			let len = read_length(r)?;
			r.read_slice(len, |b: &[u8]| Ok(b.to_vec()))?
		}
		Repr::Fixed { size } => r.read_slice(size, |b: &[u8]| Ok(b.to_vec()))?,
	};
	let unscaled = twos_complement_to_i128(&bytes)?;
	Ok(Decimal::from_i128_with_scale(unscaled, scale))
}

fn digit_count(mut n: i128) -> usize {
	if n == 0 {
		return 1;
	}
	if n < 0 {
		n = n.wrapping_neg();
	}
	let mut digits = 0;
	while n != 0 {
		digits += 1;
		n /= 10;
	}
	digits
}

/// Strips redundant leading `0x00` (positive) or `0xFF` (negative) bytes
/// while keeping the value's sign bit intact, the minimal two's-complement
/// representation possible.
fn minimal_twos_complement(full_be: &[u8; 16]) -> &[u8] {
	let negative = full_be[0] & 0x80 != 0;
	let filler = if negative { 0xFF } else { 0x00 };
	let mut start = 0;
	while start + 1 < full_be.len()
		&& full_be[start] == filler
		&& (full_be[start + 1] & 0x80 != 0) == negative
	{
		start += 1;
	}
	&full_be[start..]
}

fn twos_complement_to_i128(bytes: &[u8]) -> Result<i128, CodecError> {
	if bytes.is_empty() {
		return Ok(0);
	}
	if bytes.len() > 16 {
		return Err(CodecError::overflow(
			ErrorLocation::Unknown,
			format!("decimal unscaled value spans {} bytes, more than i128 can hold", bytes.len()),
		));
	}
	let negative = bytes[0] & 0x80 != 0;
	let mut buf = [if negative { 0xFFu8 } else { 0x00 }; 16];
	let start = 16 - bytes.len();
	buf[start..].copy_from_slice(bytes);
	Ok(i128::from_be_bytes(buf))
}
