//! Data binding for the ActivityStreams 2.0 vocabulary.
//!
//! The heart of the crate is a generic polymorphic property codec: every
//! vocabulary property is a slot (or ordered list of slots) whose legal
//! value shapes are described by data, an ordered candidate list, rather
//! than by per-property code. Decoding resolves a raw JSON value to
//! exactly one alternative, tracking which one matched and preserving
//! anything unrecognized verbatim; encoding reverses the mapping with the
//! wire format's scalar/array collapsing rules.

pub mod envelope;
pub mod errors;
pub mod ldmodel;
pub mod primitives;
pub mod property;
pub mod registry;
pub mod slot;
pub mod vocab;
