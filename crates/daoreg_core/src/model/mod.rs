//! Value records shared by the registry and storage backends.
//!
//! # Invariants
//! - Records are immutable once handed to a `Manager`.

pub mod data_source;
