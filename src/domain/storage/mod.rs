//! Object storage domain

mod entity;
mod object_store;

pub use entity::StoredObject;
pub use object_store::ObjectStore;

#[cfg(test)]
pub use object_store::mock;
