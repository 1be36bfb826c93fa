//! Concrete shape hints for [`super::ArrayDescriptor`]/[`super::MapDescriptor`]
//!
//! These never influence wire format (Avro has no concept of "this array was
//! a `VecDeque`") — they only matter when the Codec Builder needs to
//! construct a concrete collection on decode.

/// Concrete shape of a sequence-like host type (§3.2 "concrete shape hint")
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceShape {
	List,
	Set,
	Queue,
	Stack,
	/// A fixed-size array (e.g. Rust's `[T; N]`)
	FixedSizeArray,
	LinkedList,
	ImmutableSet,
	/// A sequence whose mutations should be observable (e.g. a host
	/// `ObservableCollection`-style type); not modeled further in Rust, kept
	/// for parity with the host-neutral vocabulary of §3.2
	Observable,
}

/// Concrete shape of a map-like host type (§3.2 "concrete shape hint")
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapShape {
	HashMap,
	BTreeMap,
}
