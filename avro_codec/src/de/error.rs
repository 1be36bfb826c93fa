//! Adapts [`CodecError`] to `serde::de::Error`

use crate::error::{CodecError, ErrorLocation};
use std::fmt;

impl serde::de::Error for CodecError {
	fn custom<T: fmt::Display>(msg: T) -> Self {
		CodecError::invalid_data(ErrorLocation::Unknown, msg.to_string())
	}
}
