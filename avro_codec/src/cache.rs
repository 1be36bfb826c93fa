//! The process-wide `(schema-identity, T)` codec cache (§5)
//!
//! Building a codec walks the schema and records the association between
//! the schema's fields/variants and the host type's shape; §5 wants that
//! legwork to happen once per distinct `(Schema, T)` pair for the lifetime
//! of a process, not once per `encode`/`decode` call. [`CodecCache`] is the
//! `RwLock`-guarded `HashMap` that provides that, keyed by
//! `(Schema::fingerprint, TypeId::of::<T>())`.
//!
//! Compiled encoders/decoders borrow their `Schema` (`BinaryEncoder<'s, T>`
//! borrows `&'s Schema`), so a schema handed to this cache is interned into
//! `'static` storage via [`CodecCache::intern_schema`] — leaked once with
//! [`Box::leak`]. Avro-using services typically see a small, bounded
//! number of distinct schemas over a process's life (the same handful are
//! looked up over and over), so this is the same trade a process-wide
//! string-interning table makes, not an unbounded leak.

use crate::codec::CodecBuilder;
use crate::de::{self, BinaryDecoder};
use crate::error::BuildError;
use crate::schema::Schema;
use crate::ser::{self, BinaryEncoder};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

type CacheKey = (u64, TypeId);
type Slot = Arc<OnceLock<Box<dyn Any + Send + Sync>>>;

/// A cache of compiled `(Schema, T)` binary/JSON codecs
///
/// A single process-wide instance is available via [`CodecCache::global`].
/// Nothing stops a caller from keeping their own instance for narrower
/// scoping (e.g. one per test, discarded at the end of the test).
pub struct CodecCache {
	builder: CodecBuilder,
	schemas: RwLock<HashMap<u64, &'static Schema>>,
	binary_encoders: RwLock<HashMap<CacheKey, Slot>>,
	binary_decoders: RwLock<HashMap<CacheKey, Slot>>,
	json_encoders: RwLock<HashMap<CacheKey, Slot>>,
	json_decoders: RwLock<HashMap<CacheKey, Slot>>,
}

impl Default for CodecCache {
	fn default() -> Self {
		Self::new(CodecBuilder::new())
	}
}

impl CodecCache {
	/// A fresh, empty cache compiling codecs with `builder`'s chain of
	/// [`crate::codec::BuilderCase`]s.
	pub fn new(builder: CodecBuilder) -> Self {
		Self {
			builder,
			schemas: RwLock::new(HashMap::new()),
			binary_encoders: RwLock::new(HashMap::new()),
			binary_decoders: RwLock::new(HashMap::new()),
			json_encoders: RwLock::new(HashMap::new()),
			json_decoders: RwLock::new(HashMap::new()),
		}
	}

	/// The process-wide default instance, built with a case-free
	/// [`CodecBuilder`].
	pub fn global() -> &'static CodecCache {
		static GLOBAL: OnceLock<CodecCache> = OnceLock::new();
		GLOBAL.get_or_init(CodecCache::default)
	}

	/// Intern `schema`, returning a `'static` reference stable for the
	/// remaining life of the process. Interning the same schema (by
	/// [`Schema::fingerprint`]) twice returns the same reference; the second
	/// `schema` value is dropped.
	pub fn intern_schema(&self, schema: Schema) -> &'static Schema {
		let fingerprint = schema.fingerprint();
		if let Some(existing) = self.schemas.read().unwrap().get(&fingerprint) {
			return existing;
		}
		let leaked: &'static Schema = Box::leak(Box::new(schema));
		let mut schemas = self.schemas.write().unwrap();
		*schemas.entry(fingerprint).or_insert(leaked)
	}

	fn slot(map: &RwLock<HashMap<CacheKey, Slot>>, key: CacheKey) -> Slot {
		if let Some(slot) = map.read().unwrap().get(&key) {
			return slot.clone();
		}
		map.write().unwrap().entry(key).or_insert_with(|| Arc::new(OnceLock::new())).clone()
	}

	/// The cached binary encoder for `(schema, T)`, building and caching it
	/// on the first call for this key.
	pub fn binary_encoder<T>(&self, schema: &'static Schema) -> Result<Arc<BinaryEncoder<'static, T>>, BuildError>
	where
		T: serde::Serialize + crate::descriptor::Described + 'static,
	{
		let key = (schema.fingerprint(), TypeId::of::<T>());
		let slot = Self::slot(&self.binary_encoders, key);
		if let Some(cached) = slot.get() {
			tracing::trace!(ty = std::any::type_name::<T>(), "binary encoder cache hit");
			return Ok(downcast(cached));
		}
		tracing::debug!(ty = std::any::type_name::<T>(), "compiling binary encoder");
		let built = Arc::new(self.builder.build_binary_encoder::<T>(schema)?);
		// Lost races just discard their own build; the slot keeps whichever
		// completed first.
		let _ = slot.set(Box::new(built.clone()));
		Ok(match slot.get() {
			Some(cached) => downcast(cached),
			None => built,
		})
	}

	/// The cached binary decoder for `(schema, T)`.
	pub fn binary_decoder<T>(&self, schema: &'static Schema) -> Result<Arc<BinaryDecoder<'static, T>>, BuildError>
	where
		T: serde::de::DeserializeOwned + crate::descriptor::Described + 'static,
	{
		let key = (schema.fingerprint(), TypeId::of::<T>());
		let slot = Self::slot(&self.binary_decoders, key);
		if let Some(cached) = slot.get() {
			tracing::trace!(ty = std::any::type_name::<T>(), "binary decoder cache hit");
			return Ok(downcast(cached));
		}
		tracing::debug!(ty = std::any::type_name::<T>(), "compiling binary decoder");
		let built = Arc::new(self.builder.build_binary_decoder::<T>(schema)?);
		let _ = slot.set(Box::new(built.clone()));
		Ok(match slot.get() {
			Some(cached) => downcast(cached),
			None => built,
		})
	}

	/// The cached JSON encoder for `(schema, T)`.
	pub fn json_encoder<T>(&self, schema: &'static Schema) -> Result<Arc<ser::json::JsonEncoder<'static, T>>, BuildError>
	where
		T: serde::Serialize + crate::descriptor::Described + 'static,
	{
		let key = (schema.fingerprint(), TypeId::of::<T>());
		let slot = Self::slot(&self.json_encoders, key);
		if let Some(cached) = slot.get() {
			tracing::trace!(ty = std::any::type_name::<T>(), "json encoder cache hit");
			return Ok(downcast(cached));
		}
		tracing::debug!(ty = std::any::type_name::<T>(), "compiling json encoder");
		let built = Arc::new(self.builder.build_json_encoder::<T>(schema)?);
		let _ = slot.set(Box::new(built.clone()));
		Ok(match slot.get() {
			Some(cached) => downcast(cached),
			None => built,
		})
	}

	/// The cached JSON decoder for `(schema, T)`.
	pub fn json_decoder<T>(&self, schema: &'static Schema) -> Result<Arc<de::json::JsonDecoder<'static, T>>, BuildError>
	where
		T: serde::de::DeserializeOwned + crate::descriptor::Described + 'static,
	{
		let key = (schema.fingerprint(), TypeId::of::<T>());
		let slot = Self::slot(&self.json_decoders, key);
		if let Some(cached) = slot.get() {
			tracing::trace!(ty = std::any::type_name::<T>(), "json decoder cache hit");
			return Ok(downcast(cached));
		}
		tracing::debug!(ty = std::any::type_name::<T>(), "compiling json decoder");
		let built = Arc::new(self.builder.build_json_decoder::<T>(schema)?);
		let _ = slot.set(Box::new(built.clone()));
		Ok(match slot.get() {
			Some(cached) => downcast(cached),
			None => built,
		})
	}
}

fn downcast<T: 'static>(boxed: &Box<dyn Any + Send + Sync>) -> Arc<T> {
	boxed
		.downcast_ref::<Arc<T>>()
		.expect("cache slot type mismatch: TypeId collided with a distinct type")
		.clone()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(serde_derive::Serialize, serde_derive::Deserialize, Debug, PartialEq)]
	struct Point {
		x: i32,
		y: i32,
	}

	#[test]
	fn same_schema_and_type_share_one_build() {
		let cache = CodecCache::default();
		let schema: Schema = r#"{"type":"record","name":"Point","fields":[
			{"name":"x","type":"int"},{"name":"y","type":"int"}
		]}"#
		.parse()
		.unwrap();
		let schema = cache.intern_schema(schema);

		let a = cache.binary_encoder::<Point>(schema).unwrap();
		let b = cache.binary_encoder::<Point>(schema).unwrap();
		assert!(Arc::ptr_eq(&a, &b));
	}

	#[test]
	fn round_trips_through_the_cache() {
		let cache = CodecCache::default();
		let schema: Schema = r#"{"type":"record","name":"Point","fields":[
			{"name":"x","type":"int"},{"name":"y","type":"int"}
		]}"#
		.parse()
		.unwrap();
		let schema = cache.intern_schema(schema);

		let point = Point { x: 1, y: -2 };
		let encoder = cache.binary_encoder::<Point>(schema).unwrap();
		let bytes = encoder.encode_to_vec(&point).unwrap();
		let decoder = cache.binary_decoder::<Point>(schema).unwrap();
		assert_eq!(decoder.decode(&bytes).unwrap(), point);
	}
}
