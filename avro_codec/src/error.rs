//! The error taxonomy shared by every component (§4.1)
//!
//! Build-time errors ([`SchemaError`], [`BuildError`]) are reported eagerly
//! and carry the offending schema path / host type name. Run-time errors
//! ([`CodecError`]) carry a byte offset or JSON token path and are never
//! retried by the core.

use std::fmt;

/// A single step in a schema path, used to contextualize errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathElement {
	/// Descended into a record field by name
	Field(String),
	/// Descended into an array's item schema
	ArrayItem,
	/// Descended into a map's value schema
	MapValue,
	/// Descended into a union branch by index
	UnionBranch(usize),
}

impl fmt::Display for PathElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PathElement::Field(name) => write!(f, ".{name}"),
			PathElement::ArrayItem => write!(f, "[]"),
			PathElement::MapValue => write!(f, "{{}}"),
			PathElement::UnionBranch(idx) => write!(f, "<{idx}>"),
		}
	}
}

/// A schema path from the root, used to contextualize build errors
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaPath(pub Vec<PathElement>);

impl fmt::Display for SchemaPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("$")?;
		for element in &self.0 {
			write!(f, "{element}")?;
		}
		Ok(())
	}
}

/// Why a schema could not be turned into a [`Schema`](crate::schema::Schema),
/// or why a schema document could not be parsed
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SchemaError {
	message: String,
}

impl SchemaError {
	pub(crate) fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
	pub(crate) fn msg(args: fmt::Arguments<'_>) -> Self {
		Self {
			message: args.to_string(),
		}
	}
}

/// The kind of a [`BuildError`], mirroring §4.1's build-time half of the
/// taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildErrorKind {
	/// The schema node is malformed or cannot be represented
	UnsupportedSchema,
	/// The host type cannot represent values of this schema
	UnsupportedType,
	/// A record field has no default and no host member matched it
	DefaultMissing,
}

impl fmt::Display for BuildErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			BuildErrorKind::UnsupportedSchema => "UnsupportedSchema",
			BuildErrorKind::UnsupportedType => "UnsupportedType",
			BuildErrorKind::DefaultMissing => "DefaultMissing",
		};
		f.write_str(s)
	}
}

/// An error produced while compiling a `(Schema, T)` pair into a codec
///
/// Always carries the schema path from the root and, when relevant, the host
/// type's name, so that the failure is actionable without re-running the
/// build with extra instrumentation.
#[derive(Debug, thiserror::Error)]
#[error("{kind} at {path}: {reason}{type_suffix}", type_suffix = self.type_name.as_ref().map(|t| format!(" (host type: {t})")).unwrap_or_default())]
pub struct BuildError {
	pub kind: BuildErrorKind,
	pub path: SchemaPath,
	pub reason: String,
	pub type_name: Option<&'static str>,
}

impl BuildError {
	pub fn new(kind: BuildErrorKind, path: SchemaPath, reason: impl Into<String>) -> Self {
		Self {
			kind,
			path,
			reason: reason.into(),
			type_name: None,
		}
	}
	pub fn with_type_name(mut self, type_name: &'static str) -> Self {
		self.type_name = Some(type_name);
		self
	}
	pub fn unsupported_schema(path: SchemaPath, reason: impl Into<String>) -> Self {
		Self::new(BuildErrorKind::UnsupportedSchema, path, reason)
	}
	pub fn unsupported_type(path: SchemaPath, reason: impl Into<String>) -> Self {
		Self::new(BuildErrorKind::UnsupportedType, path, reason)
	}
	pub fn default_missing(path: SchemaPath, reason: impl Into<String>) -> Self {
		Self::new(BuildErrorKind::DefaultMissing, path, reason)
	}
}

/// Where, in the input being decoded, a [`CodecError`] occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
	/// Byte offset into the binary payload
	ByteOffset(usize),
	/// JSON token path (a dotted/bracketed path mirroring [`SchemaPath`])
	JsonPath(String),
	/// No finer-grained location is available
	Unknown,
}

impl fmt::Display for ErrorLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ErrorLocation::ByteOffset(offset) => write!(f, "byte offset {offset}"),
			ErrorLocation::JsonPath(path) => write!(f, "json path {path}"),
			ErrorLocation::Unknown => f.write_str("unknown location"),
		}
	}
}

/// A run-time failure while encoding or decoding a value (§4.1, §7)
///
/// Encoding/decoding a record aborts on the first field failure; the
/// underlying writer/reader is left in an indeterminate position and must be
/// discarded by the caller (§7 "Partial failure").
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
	/// The input bytes/JSON do not conform to the schema
	#[error("invalid data at {location}: {reason}")]
	InvalidData {
		location: ErrorLocation,
		reason: String,
	},
	/// A decoded integer exceeds the target's representable range
	#[error("overflow at {location}: {reason}")]
	Overflow {
		location: ErrorLocation,
		reason: String,
	},
	/// An unknown record field had no default and no "ignore" policy applied
	#[error("default missing at {location}: {reason}")]
	DefaultMissing {
		location: ErrorLocation,
		reason: String,
	},
	/// The underlying writer/reader raised an I/O error
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

impl CodecError {
	pub fn invalid_data(location: ErrorLocation, reason: impl Into<String>) -> Self {
		CodecError::InvalidData {
			location,
			reason: reason.into(),
		}
	}
	pub fn overflow(location: ErrorLocation, reason: impl Into<String>) -> Self {
		CodecError::Overflow {
			location,
			reason: reason.into(),
		}
	}
	pub fn default_missing(location: ErrorLocation, reason: impl Into<String>) -> Self {
		CodecError::DefaultMissing {
			location,
			reason: reason.into(),
		}
	}
}

/// A user-facing error for CLI/registry wrappers (§7 "User-facing reporting")
///
/// Wraps any inner error with an exit code (always `1` today, kept as a field
/// for forward compatibility) and writes `message` to stderr; `cause` is
/// available for `{:?}`/`source()` introspection but is not printed by
/// `{}` so stderr output stays single-line.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProgramError {
	pub code: i32,
	pub message: String,
	#[source]
	pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProgramError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			code: 1,
			message: message.into(),
			cause: None,
		}
	}
	pub fn wrap(
		message: impl Into<String>,
		cause: impl std::error::Error + Send + Sync + 'static,
	) -> Self {
		Self {
			code: 1,
			message: message.into(),
			cause: Some(Box::new(cause)),
		}
	}
}
