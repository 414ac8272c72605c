//! Low-level byte stream reading and writing.
//!
//! [`BinarySerializer`] accumulates canonical bytes on encode;
//! [`BinaryParser`] is the matching cursor for decode. Both implement
//! the field-ID tag scheme and the variable-length prefix encoding
//! shared by every field in the protocol.

mod parser;
mod serializer;

pub use parser::BinaryParser;
pub use serializer::{encode_variable_length, BinarySerializer};

pub(crate) use serializer::field_header;
