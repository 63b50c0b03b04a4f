//! Entity event sources.
//!
//! A source is a one-pass, forward-only stream of [`EntityRecord`]s. The
//! pipeline pulls from it until it returns `Ok(None)`; any `Err` aborts the
//! run.

mod error;
mod iter;
#[cfg(feature = "pbf")]
mod pbf;

pub use error::SourceError;
pub use iter::{from_entities, IterEntitySource};
#[cfg(feature = "pbf")]
pub use pbf::PbfEntitySource;

use crate::model::EntityRecord;

/// Sequential stream of decoded entities.
pub trait EntitySource {
    /// Pull the next entity, or `Ok(None)` at end of stream.
    fn next_entity(&mut self) -> Result<Option<EntityRecord>, SourceError>;
}

impl<S: EntitySource + ?Sized> EntitySource for &mut S {
    fn next_entity(&mut self) -> Result<Option<EntityRecord>, SourceError> {
        (**self).next_entity()
    }
}

impl<S: EntitySource + ?Sized> EntitySource for Box<S> {
    fn next_entity(&mut self) -> Result<Option<EntityRecord>, SourceError> {
        (**self).next_entity()
    }
}
