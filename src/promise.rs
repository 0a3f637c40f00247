use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::executor::block_on;

use crate::executor::Executor;
use crate::fault;
use crate::slot::Slot;
use crate::Error;

/// Where a promise is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Pending,
    Fulfilled,
    Rejected,
}

impl State {
    fn of<T>(outcome: Option<&Result<T, Error>>) -> Self {
        match outcome {
            None => Self::Pending,
            Some(Ok(_)) => Self::Fulfilled,
            Some(Err(_)) => Self::Rejected,
        }
    }
}

/// A value of type `T` that will be available later, or the reason it never
/// will be.
///
/// Clones are handles to the same promise: any of them may settle it, and
/// all of them observe the same outcome. Settling happens at most once; later
/// calls to [`resolve`](Self::resolve) or [`reject`](Self::reject) are
/// ignored.
///
/// # Examples
///
/// ```
/// use promise_out::Promise;
///
/// let promise = Promise::<i32>::new();
/// let doubled = promise.then(|v| Ok(v + 5)).then(|v| Ok(v * 2));
/// promise.resolve(5);
/// assert_eq!(doubled.wait().unwrap(), 20);
/// ```
pub struct Promise<T> {
    slot: Arc<Slot<T>>,
    executor: Executor,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<T> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Promise<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Promise");
        out.field("state", &self.state());
        match self.outcome() {
            Some(Ok(value)) => out.field("value", value),
            Some(Err(err)) => out.field("error", err),
            None => &mut out,
        };
        out.finish()
    }
}

impl<T> Promise<T> {
    /// A pending promise whose continuations run on the shared executor.
    pub fn new() -> Self {
        Self::with_executor(Executor::global())
    }

    /// A pending promise whose continuations, and theirs, run on `executor`.
    pub fn with_executor(executor: Executor) -> Self {
        Self {
            slot: Arc::new(Slot::new()),
            executor,
        }
    }

    /// A promise already fulfilled with `value`.
    pub fn resolved(value: T) -> Self {
        let promise = Self::new();
        promise.resolve(value);
        promise
    }

    /// A promise already rejected with `err`.
    pub fn rejected(err: impl Into<Error>) -> Self {
        let promise = Self::new();
        promise.reject(err);
        promise
    }

    /// The executor this promise's continuations are spawned on.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// A snapshot of the current state; it can only move away from `Pending`.
    pub fn state(&self) -> State {
        State::of(self.slot.get())
    }

    /// `true` until the promise is resolved or rejected.
    pub fn is_pending(&self) -> bool {
        self.state() == State::Pending
    }

    /// `true` once the promise is resolved or rejected.
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// The fulfilled value, if there is one yet.
    pub fn value(&self) -> Option<&T> {
        self.slot.get()?.as_ref().ok()
    }

    /// The rejection reason, if there is one yet.
    pub fn error(&self) -> Option<&Error> {
        self.slot.get()?.as_ref().err()
    }

    /// The settled outcome, or `None` while pending.
    pub fn outcome(&self) -> Option<&Result<T, Error>> {
        self.slot.get()
    }

    /// Fulfills the promise. Returns `false` if it was already settled.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_out::Promise;
    /// use std::thread;
    ///
    /// let promise = Promise::<String>::new();
    /// let producer = promise.clone();
    /// let task = thread::spawn(move || producer.resolve(String::from("🍓")));
    /// assert_eq!(promise.wait().unwrap(), "🍓");
    /// assert!(task.join().unwrap());
    /// assert!(!promise.resolve(String::from("🍌")));
    /// ```
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects the promise. Returns `false` if it was already settled.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_out::Promise;
    ///
    /// let promise = Promise::<u8>::new();
    /// assert!(promise.reject("💥"));
    /// assert_eq!(promise.wait().unwrap_err().to_string(), "💥");
    /// ```
    pub fn reject(&self, err: impl Into<Error>) -> bool {
        self.settle(Err(err.into()))
    }

    /// Settles with either outcome. Exactly one concurrent caller wins.
    pub fn settle(&self, outcome: Result<T, Error>) -> bool {
        let state = State::of(Some(&outcome));
        if self.slot.fill(outcome) {
            tracing::debug!(?state, "promise settled");
            true
        } else {
            tracing::trace!(?state, "promise already settled; ignoring");
            false
        }
    }
}

impl<T> Promise<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Runs `on_fulfilled` with the value once this promise fulfills.
    ///
    /// The returned promise settles with the callback's result. A rejection of
    /// this promise skips the callback and is passed along unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_out::Promise;
    ///
    /// let name = Promise::resolved(String::from("John"));
    /// let length = name.then(|name| Ok(name.len()));
    /// assert_eq!(length.wait().unwrap(), 4);
    /// ```
    pub fn then<U, F>(&self, on_fulfilled: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> Result<U, Error> + Send + 'static,
    {
        self.chain("then", move |outcome| match outcome {
            Ok(value) => fault::isolate(move || on_fulfilled(value)).and_then(|result| result),
            Err(err) => Err(err),
        })
    }

    /// Runs `on_rejected` with the error once this promise rejects.
    ///
    /// The returned promise settles with the callback's result. A fulfilled
    /// value skips the callback and is passed along unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_out::Promise;
    ///
    /// let name = Promise::<String>::rejected("init failed");
    /// let name = name.catch(|err| Ok(format!("fallback after {err}")));
    /// assert_eq!(name.wait().unwrap(), "fallback after init failed");
    /// ```
    pub fn catch<F>(&self, on_rejected: F) -> Promise<T>
    where
        F: FnOnce(Error) -> Result<T, Error> + Send + 'static,
    {
        self.chain("catch", move |outcome| match outcome {
            Ok(value) => Ok(value),
            Err(err) => fault::isolate(move || on_rejected(err)).and_then(|result| result),
        })
    }

    /// Runs `on_settled` once this promise settles either way, then passes the
    /// outcome along unchanged. Only a panic in `on_settled` changes it.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_out::Promise;
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// let finished = Arc::new(AtomicBool::new(false));
    /// let flag = finished.clone();
    /// let done = Promise::<i32>::rejected("boom").finally(move || flag.store(true, Ordering::SeqCst));
    /// assert_eq!(done.wait().unwrap_err().to_string(), "boom");
    /// assert!(finished.load(Ordering::SeqCst));
    /// ```
    pub fn finally<F>(&self, on_settled: F) -> Promise<T>
    where
        F: FnOnce() + Send + 'static,
    {
        self.chain("finally", move |outcome| {
            fault::isolate(on_settled)?;
            outcome
        })
    }

    /// A future resolving to this promise's outcome.
    pub fn settled(&self) -> Settled<T> {
        Settled {
            slot: self.slot.clone(),
        }
    }

    /// Blocks the current thread until the promise settles.
    ///
    /// Do not call this from a task running on the promise's own executor:
    /// it parks a worker that a continuation may need.
    pub fn wait(&self) -> Result<T, Error> {
        block_on(self.settled())
    }

    fn chain<U, F>(&self, kind: &'static str, step: F) -> Promise<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(Result<T, Error>) -> Result<U, Error> + Send + 'static,
    {
        let child = Promise::with_executor(self.executor.clone());
        let parent = self.settled();
        let target = child.clone();
        let task = async move {
            let outcome = parent.await;
            target.settle(step(outcome));
        };
        tracing::trace!(kind, "scheduling continuation");
        if let Err(err) = self.executor.spawn(task) {
            tracing::warn!(kind, %err, "rejecting continuation that could not be scheduled");
            child.reject(err);
        }
        child
    }
}

impl<T> IntoFuture for Promise<T>
where
    T: Clone,
{
    type Output = Result<T, Error>;
    type IntoFuture = Settled<T>;

    fn into_future(self) -> Self::IntoFuture {
        Settled { slot: self.slot }
    }
}

/// Future returned by [`Promise::settled`]. Any number may wait on the same
/// promise; each gets its own copy of the outcome.
#[must_use = "futures do nothing unless polled"]
pub struct Settled<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Future for Settled<T>
where
    T: Clone,
{
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.slot.poll_settled(cx).map(Clone::clone)
    }
}

impl<T> fmt::Debug for Settled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settled")
            .field("state", &State::of(self.slot.get()))
            .finish()
    }
}
