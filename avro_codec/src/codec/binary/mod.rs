//! Binary Avro encoding (§4.3, component C)

pub mod blocks;
pub mod decimal;
pub mod primitives;
pub mod reader;

pub use reader::{BinaryRead, BinaryReadSlice, IoReader, SliceReader, SliceVisitor};
