use crate::client::ValueStream;
use crate::common::Convertible;
use crate::errors::{EntidocResult, EntidocError, ErrorKind};
use crate::metadata::EntityDescriptor;
use crate::query::ResultKind;
use crate::repository::DocumentCodec;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq)]
enum StreamState {
    Active,
    Exhausted,
}

/// A finite, forward-only, single-pass stream of typed query results.
///
/// Each element is deserialized on demand from the underlying raw value
/// stream. Exhaustion (first empty poll) and [ObjectStream::close] both
/// transition the stream to its terminal state; further advancement
/// attempts are no-ops, never a cursor restart.
///
/// The stream is owned by a single consuming thread for its lifetime; it is
/// not safe for concurrent advancement.
pub struct ObjectStream<R> {
    items: ValueStream,
    root: Arc<EntityDescriptor>,
    result_kind: ResultKind,
    state: StreamState,
    _phantom: PhantomData<R>,
}

impl<R> ObjectStream<R>
where
    R: Convertible<Output = R>,
{
    pub(crate) fn new(
        items: ValueStream,
        root: Arc<EntityDescriptor>,
        result_kind: ResultKind,
    ) -> Self {
        ObjectStream {
            items,
            root,
            result_kind,
            state: StreamState::Active,
            _phantom: PhantomData,
        }
    }

    /// Terminates the stream. Idempotent; a closed stream yields nothing.
    pub fn close(&mut self) {
        self.state = StreamState::Exhausted;
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == StreamState::Exhausted
    }
}

impl<R> Iterator for ObjectStream<R>
where
    R: Convertible<Output = R>,
{
    type Item = EntidocResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == StreamState::Exhausted {
                return None;
            }
            let value = match self.items.next() {
                None => {
                    self.state = StreamState::Exhausted;
                    return None;
                }
                Some(Err(e)) => {
                    return Some(Err(EntidocError::new_with_cause(
                        "Error retrieving next query result",
                        ErrorKind::DataAccessError,
                        e,
                    )))
                }
                Some(Ok(value)) => value,
            };
            match self.result_kind {
                ResultKind::Entity | ResultKind::DtoProjection => {
                    return Some(DocumentCodec::decode::<R>(&value, &self.root));
                }
                ResultKind::Scalar => match R::convert_value(&value) {
                    Some(converted) => return Some(Ok(converted)),
                    None => {
                        // no representation in the target type; skip
                        log::debug!("Skipping scalar result {} with no conversion", value);
                        continue;
                    }
                },
            }
        }
    }
}
