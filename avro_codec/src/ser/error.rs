//! Adapts [`CodecError`]/[`BuildError`] to `serde::ser::Error`

use crate::error::{CodecError, ErrorLocation};
use std::fmt;

impl serde::ser::Error for CodecError {
	fn custom<T: fmt::Display>(msg: T) -> Self {
		CodecError::invalid_data(ErrorLocation::Unknown, msg.to_string())
	}
}
