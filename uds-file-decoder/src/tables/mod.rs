//! Lookup tables loaded from a definition directory
//!
//! This module contains the dictionaries, the redirect table, the
//! value-name lookup and the base tables, plus the database tying them
//! together.

pub mod database;
pub mod dictionary;
pub mod redirect;
pub mod value_names;

// Re-export key types for convenience
pub use database::{BaseTable, DatabaseStats, DefinitionDatabase};
pub use dictionary::{TextDictionary, TEXT_SEGMENT, UNIT_SEGMENT};
pub use redirect::{Redirect, RedirectMap};
pub use value_names::{ValueNameLookup, VALUE_NAME_MIN_FIELDS, VALUE_NAME_SEGMENT};
