use crate::HeaderId;

/// Failures the stacking core can run into.
///
/// None of these is fatal: the engine recovers from each one locally (offset 0, not fixed, or the
/// previous tick's value) and retries on the next tick. The `try_*` accessors surface them to
/// callers that want to know.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    #[error("{0} is not registered")]
    NotRegistered(HeaderId),
    #[error("{0} is already registered")]
    DuplicateRegistration(HeaderId),
    #[error("{0} could not be measured")]
    MeasurementUnavailable(HeaderId),
}
