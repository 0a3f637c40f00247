//! Keeps a panicking callback from taking its continuation task down with it.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::Error;

/// Runs `callback`, turning a panic into [`Error::Panicked`].
///
/// A panic raised with an [`Error`] payload (`std::panic::panic_any(err)`) is
/// returned as that error.
pub(crate) fn isolate<F, R>(callback: F) -> Result<R, Error>
where
    F: FnOnce() -> R,
{
    panic::catch_unwind(AssertUnwindSafe(callback)).map_err(|payload| {
        let err = into_error(payload);
        tracing::warn!(%err, "continuation panicked; rejecting downstream promise");
        err
    })
}

fn into_error(payload: Box<dyn Any + Send>) -> Error {
    let payload = match payload.downcast::<Error>() {
        Ok(err) => return *err,
        Err(payload) => payload,
    };
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    Error::Panicked { message }
}
