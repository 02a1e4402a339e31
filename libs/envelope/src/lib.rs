//! # stratus-envelope
//!
//! Resource envelope codec and typed body access for the stratus harness.
//!
//! Services under test wrap every body under a single top-level key named
//! after the resource: `{"server": {...}}` on the way in and out,
//! `{"servers": [...]}` for collections. This crate owns that convention
//! so nothing above it ever touches raw JSON.
//!
//! ## Design Principles
//!
//! - The wire format is a strategy ([`BodyCodec`]) picked at client
//!   construction, not a class hierarchy
//! - Decoded bodies are [`Fields`] with typed accessors; raw string
//!   indexing stops at this boundary
//! - A field set to JSON `null` means "unset" and is dropped on encode;
//!   nulls in responses are data and survive decode
//! - Malformed payloads fail loudly with the offending key and shape

mod codec;
mod error;
mod fields;
mod kind;

pub use codec::{BodyCodec, JsonEnvelope};
pub use error::{EnvelopeError, FieldError};
pub use fields::Fields;
pub use kind::ResourceKind;

// Used by the fields! macro.
#[doc(hidden)]
pub use serde_json as __serde_json;
