//! Where continuation tasks run.
//!
//! Every promise carries an [`Executor`] and hands it down to the children
//! created by `then`, `catch` and `finally`. Unless told otherwise, promises
//! share one process-wide thread pool sized by [`ExecutorConfig::from_env`].
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::thread;

use futures::executor::{block_on, ThreadPool};
use futures::future::FutureObj;
use futures::task::{Spawn, SpawnError};

use crate::Error;

/// Environment variable overriding the shared pool's thread count.
pub const POOL_SIZE_ENV: &str = "PROMISE_OUT_POOL_SIZE";
/// Environment variable overriding the shared pool's thread name prefix.
pub const THREAD_PREFIX_ENV: &str = "PROMISE_OUT_THREAD_PREFIX";

const DEFAULT_PREFIX: &str = "promise-out-";

static GLOBAL: OnceLock<Executor> = OnceLock::new();

/// Thread pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Worker count; `None` lets the pool pick one per CPU.
    pub pool_size: Option<usize>,
    pub name_prefix: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            pool_size: None,
            name_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl ExecutorConfig {
    /// Defaults overridden by [`POOL_SIZE_ENV`] and [`THREAD_PREFIX_ENV`].
    ///
    /// Unparseable or zero pool sizes are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(POOL_SIZE_ENV) {
            match parse_pool_size(&raw) {
                Some(size) => config.pool_size = Some(size),
                None => tracing::warn!(value = %raw, "ignoring invalid {POOL_SIZE_ENV}"),
            }
        }
        if let Ok(prefix) = std::env::var(THREAD_PREFIX_ENV) {
            if !prefix.trim().is_empty() {
                config.name_prefix = prefix;
            }
        }
        config
    }

    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }
}

fn parse_pool_size(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|size| *size > 0)
}

/// A cloneable handle to something that can run continuation tasks.
#[derive(Clone)]
pub struct Executor {
    spawner: Arc<dyn Spawn + Send + Sync>,
}

impl Executor {
    /// Builds a private thread pool.
    pub fn new(config: &ExecutorConfig) -> Result<Self, Error> {
        let mut builder = ThreadPool::builder();
        builder.name_prefix(config.name_prefix.clone());
        match config.pool_size {
            Some(size) if size > 0 => {
                builder.pool_size(size);
            }
            Some(_) => tracing::warn!("ignoring zero pool size"),
            None => {}
        }
        let pool = builder.create()?;
        tracing::debug!(?config, "continuation pool started");
        Ok(Self::from_spawner(pool))
    }

    /// The shared pool used by [`Promise::new`](crate::Promise::new).
    ///
    /// Falls back to a thread per task if the pool cannot be started.
    pub fn global() -> Self {
        GLOBAL
            .get_or_init(|| {
                Self::new(&ExecutorConfig::from_env()).unwrap_or_else(|err| {
                    tracing::warn!(%err, "continuation pool unavailable; using a thread per task");
                    Self::thread_per_task()
                })
            })
            .clone()
    }

    /// Runs each task to completion on its own short-lived thread.
    pub fn thread_per_task() -> Self {
        Self::from_spawner(ThreadPerTask)
    }

    /// Adopts any spawner, e.g. an adapter over another runtime.
    pub fn from_spawner<S>(spawner: S) -> Self
    where
        S: Spawn + Send + Sync + 'static,
    {
        Self {
            spawner: Arc::new(spawner),
        }
    }

    pub(crate) fn spawn<F>(&self, task: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawner
            .spawn_obj(FutureObj::new(Box::new(task)))
            .map_err(Error::from)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor").finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct ThreadPerTask;

impl Spawn for ThreadPerTask {
    fn spawn_obj(&self, future: FutureObj<'static, ()>) -> Result<(), SpawnError> {
        thread::Builder::new()
            .name(format!("{DEFAULT_PREFIX}task"))
            .spawn(move || block_on(future))
            .map(drop)
            .map_err(|err| {
                tracing::warn!(%err, "could not start a continuation thread");
                SpawnError::shutdown()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_pool_size, Executor, ExecutorConfig};
    use futures::executor::block_on;
    use futures::channel::oneshot;

    #[test]
    fn test_parse_pool_size() {
        assert_eq!(parse_pool_size("4"), Some(4));
        assert_eq!(parse_pool_size(" 2 "), Some(2));
        assert_eq!(parse_pool_size("0"), None);
        assert_eq!(parse_pool_size("many"), None);
    }

    #[test]
    fn test_config_builder() {
        let config = ExecutorConfig::default().pool_size(3).name_prefix("chain-");
        assert_eq!(config.pool_size, Some(3));
        assert_eq!(config.name_prefix, "chain-");
    }

    #[test]
    fn test_private_pool_runs_tasks() {
        let executor = Executor::new(&ExecutorConfig::default().pool_size(1)).unwrap();
        let (tx, rx) = oneshot::channel();
        executor
            .spawn(async move {
                let _ = tx.send(std::thread::current().name().map(str::to_owned));
            })
            .unwrap();
        let name = block_on(rx).unwrap().unwrap();
        assert!(name.starts_with("promise-out-"), "unexpected thread name {name}");
    }

    #[test]
    fn test_thread_per_task_runs_tasks() {
        let executor = Executor::thread_per_task();
        let (tx, rx) = oneshot::channel();
        executor.spawn(async move { tx.send(42).unwrap() }).unwrap();
        assert_eq!(block_on(rx).unwrap(), 42);
    }
}
