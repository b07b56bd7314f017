//! timequiz-store: File-backed key-value storage.
//!
//! Implements the `KvStore` trait from `timequiz-core` on top of a plain
//! directory, one file per key, so quiz progress survives restarts.

pub mod file;

pub use file::FileStore;
