// src/lib.rs

#![cfg_attr(not(feature = "std"), no_std)]
#![doc = "Reads, edits and writes logical name maps (`*.xlmap` files)."]
#![doc = ""]
#![doc = "A logical name map is a tree of named modules whose leaves are entries"]
#![doc = "redirecting a logical register name to a physical target (a register or a"]
#![doc = "single channel on some device), or defining a constant or variable."]
#![doc = ""]
#![doc = "It supports:"]
#![doc = "- `LogicalNameMap`: the document model and its editing operations."]
#![doc = "- `load_lmap_from_str`: Parsing an xlmap document."]
#![doc = "- `save_lmap_to_string`: Serializing a map back into an xlmap document."]
#![doc = "- `Session` (`std` feature): file-backed editing with dirty tracking."]

extern crate alloc;

// --- Crate Modules ---

mod builder;
mod error;
mod map;
mod model;
mod parser;
mod path;
mod resolver;
#[cfg(feature = "std")]
mod session;
mod types;

// --- Public API Re-exports ---

pub use builder::{SaveOptions, save_lmap_to_string, save_lmap_to_string_with};
pub use error::{LmapError, Malformed};
pub use map::{Entries, LogicalNameMap, MAX_DEPTH};
pub use parser::{MODULE_TAG, ROOT_TAG, load_lmap_from_slice, load_lmap_from_str};
pub use path::RegisterPath;
#[cfg(feature = "std")]
pub use session::Session;
pub use types::{Entry, Field, FieldValue, INTEGER_VALUE_TYPE, Module, Node, Target, TargetType};
