//! One-shot promises with `then`/`catch`/`finally` continuations.
//!
//! A [`Promise`] starts pending and is settled exactly once, either fulfilled
//! with a value or rejected with an [`Error`]. Continuations may be attached
//! before or after that happens; each one returns a new promise right away and
//! runs on the promise's [`Executor`] once its parent settles. A panicking
//! callback rejects its downstream promise rather than unwinding the task.
//!
//! # Examples
//!
//! ```
//! use promise_out::{Error, Promise};
//!
//! let promise = Promise::<i32>::new();
//! let recovered = promise
//!     .then(|_| Err::<i32, _>(Error::msg("boom")))
//!     .catch(|err| {
//!         assert_eq!(err.to_string(), "boom");
//!         Ok(-1)
//!     });
//! promise.resolve(10);
//! assert_eq!(recovered.wait().unwrap(), -1);
//! ```
mod error;
pub mod executor;
mod fault;
mod guard;
mod promise;
mod slot;

pub use error::Error;
pub use executor::{Executor, ExecutorConfig};
pub use promise::{Promise, Settled, State};
