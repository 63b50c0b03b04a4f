use super::{EntitySource, SourceError};
use crate::model::EntityRecord;

/// Entity source backed by any iterator of entity results.
///
/// The iterator is fused on the first error: once an `Err` has been yielded
/// the source reports end-of-stream, so a caller that ignores the error can't
/// read past a corrupt point.
pub struct IterEntitySource<I> {
    inner: I,
    failed: bool,
}

impl<I> IterEntitySource<I>
where
    I: Iterator<Item = Result<EntityRecord, SourceError>>,
{
    /// Wrap an iterator of entity results.
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            failed: false,
        }
    }
}

/// Source over an in-memory list of entities that never fails.
pub fn from_entities(
    entities: Vec<EntityRecord>,
) -> IterEntitySource<impl Iterator<Item = Result<EntityRecord, SourceError>>> {
    IterEntitySource::new(entities.into_iter().map(Ok::<EntityRecord, SourceError>))
}

impl<I> EntitySource for IterEntitySource<I>
where
    I: Iterator<Item = Result<EntityRecord, SourceError>>,
{
    fn next_entity(&mut self) -> Result<Option<EntityRecord>, SourceError> {
        if self.failed {
            return Ok(None);
        }
        match self.inner.next() {
            Some(Ok(entity)) => Ok(Some(entity)),
            Some(Err(e)) => {
                self.failed = true;
                Err(e)
            }
            None => Ok(None),
        }
    }
}
