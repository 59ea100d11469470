//! Factory capability contract.

use crate::context::Context;
use crate::error::DaoResult;
use std::any::Any;

/// Builds DAOs for a fixed set of declared names.
///
/// # Contract
/// - `data_access_objects` is a static declaration; the manager reads it
///   once at registration.
/// - `new_data_access_object` opens the DAO's transactional resource and
///   must track it in `ctx` (see [`Context::track`]); otherwise the
///   manager will neither commit nor roll it back.
/// - Construction errors are returned as-is; the manager does not wrap them.
pub trait Factory {
    fn data_access_objects(&self) -> Vec<String>;

    fn new_data_access_object(&self, ctx: &mut Context, name: &str) -> DaoResult<Box<dyn Any>>;
}
