//! Persistent word → definition dictionary backed by one JSON file.
//!
//! Reads go straight to the file. Writes (add / remove / update) are queued
//! to a single background worker that does the whole read-modify-write cycle
//! for one request at a time, so concurrent callers never lose each other's
//! updates.
//!
//! ```rust,no_run
//! use json_dict::Dictionary;
//!
//! let dict = Dictionary::open("dictionary.json").unwrap();
//! dict.add("hello", "a greeting").unwrap();
//! assert_eq!(dict.get("hello").unwrap().definition(), "a greeting");
//! ```
//!
//! **Single-process only.** The worker serializes writers inside one process.
//! Two processes pointing at the same file will clobber each other.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod error;
pub mod persist;
pub mod serializer;
pub mod store;
mod worker;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "http")]
pub mod http;

pub use entry::{Document, Entry};
pub use error::{Error, Result};
pub use persist::WriteMode;
pub use store::{Dictionary, DictionaryBuilder, Policy};
