//! Capability contracts implemented by storage backends.
//!
//! # Responsibility
//! - Define the transactional resource handle consumed by the manager.
//! - Define the factory contract that builds DAOs for declared names.
//!
//! # Invariants
//! - The manager only ever calls `commit`/`rollback` on tracked resources.
//! - DAO domain methods stay outside these contracts.

pub mod factory;
pub mod transaction;

pub use factory::Factory;
pub use transaction::{DataAccessObject, Transaction};
