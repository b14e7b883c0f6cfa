//! # What is Tessera?
//!
//! Tessera serves a curated knowledge base describing how the technology
//! stacks of algorithmic trading machines evolved between 2000 and 2025. The
//! standard mechanism for browsing it is the JSON server but users can also
//! import the lib, which is intended primarily for testing and for building
//! derived views within Rust.
//!
//! # Implementation
//!
//! The derivation pipeline is composed of:
//! - The record stores in [store](crate::store): a read-only technology
//! catalog, a case-study catalog with one flat-file-backed extension fed by
//! the import endpoint, and the hand-authored baseline matrix.
//! - The revision classifier in [revision](crate::revision), the single
//! authority on year ranges and on the category/module vocabulary. Every
//! component classifies through it; there are no per-component copies of the
//! boundaries.
//! - The matrix assembler in [matrix](crate::matrix), which derives the
//! integrated and dynamic views by folding the stores into the baseline.
//! - The row builder in [rows](crate::rows), which flattens the catalog into
//! one row per technology with evolution links resolved one level deep.
//! - The server implementation returning JSON responses over the derived
//! views, and a client providing a Rust API for the server, as much for
//! documenting how clients can call it.
//!
//! In addition to all this, [source](crate::source) holds best-effort lookups
//! against external sources (Wikipedia, GitHub) used only by the explicit
//! enrich action and never by the primary read path.
//!
//! ``
//! cargo run --bin tessera_server_v1 [ipv4_address] [port] [imports_file]
//! ``

pub mod http;
pub mod import;
pub mod matrix;
pub mod revision;
pub mod rows;
pub mod source;
pub mod store;
