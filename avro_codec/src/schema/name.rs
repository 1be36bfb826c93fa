//! The naming of named schemas (`record`, `enum`, `fixed`)

/// The fully qualified name of a named Avro schema (`record`, `enum`, `fixed`)
///
/// Avro names are composed of a namespace and a name; this type stores both
/// as a single fully qualified string and slices into it on demand, which
/// avoids an extra allocation for the common case where only the fully
/// qualified form is ever read back out.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Name {
	fully_qualified_name: String,
	namespace_delimiter_idx: Option<usize>,
}

impl std::fmt::Debug for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.fully_qualified_name, f)
	}
}

impl std::fmt::Display for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.fully_qualified_name)
	}
}

impl Name {
	/// The rightmost component of the fully qualified name
	///
	/// e.g. in `a.b.c` it's `c`
	pub fn name(&self) -> &str {
		match self.namespace_delimiter_idx {
			None => &self.fully_qualified_name,
			Some(delimiter_idx) => &self.fully_qualified_name[delimiter_idx + 1..],
		}
	}

	/// The namespace component of the fully qualified name
	///
	/// e.g. in `a.b.c` it's `a.b`
	pub fn namespace(&self) -> Option<&str> {
		self.namespace_delimiter_idx
			.map(|idx| &self.fully_qualified_name[..idx])
	}

	/// The fully qualified name, e.g. `a.b.c`
	pub fn fully_qualified_name(&self) -> &str {
		&self.fully_qualified_name
	}

	/// Build a [`Name`] out of a separate `name` and optional `namespace`,
	/// resolving `name` against `namespace` the way the Avro spec resolves a
	/// bare `name` field against an enclosing `namespace` field.
	pub fn new(name: &str, namespace: Option<&str>) -> Self {
		if name.contains('.') {
			return Self::from_fully_qualified_name(name);
		}
		match namespace {
			Some(namespace) if !namespace.is_empty() => {
				Self::from_fully_qualified_name(format!("{namespace}.{name}"))
			}
			_ => Self::from_fully_qualified_name(name),
		}
	}

	/// Build a [`Name`] from a fully qualified name such as `a.b.c`
	pub fn from_fully_qualified_name(fully_qualified_name: impl Into<String>) -> Self {
		let mut fully_qualified_name = fully_qualified_name.into();
		let namespace_delimiter_idx = match fully_qualified_name.rfind('.') {
			Some(0) => {
				// ".x" means {namespace: None, name: "x"}
				fully_qualified_name.remove(0);
				None
			}
			other => other,
		};
		Self {
			fully_qualified_name,
			namespace_delimiter_idx,
		}
	}
}
