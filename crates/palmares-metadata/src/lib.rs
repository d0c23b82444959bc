//! Palmarès — attribute-set document codec.
//!
//! Builds and parses the JSON attribute documents stored in the content
//! store. Pure and stateless: no ports, no I/O.

pub mod codec;
pub mod document;
pub mod error;
