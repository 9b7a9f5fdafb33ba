//! Bounded worker pool for lookups
//!
//! With the `parallel` feature the pool owns a dedicated rayon thread pool
//! sized to the concurrency cap, so lookups never run on the global pool and
//! never exceed the cap. Without it, work runs on the calling thread.

use crate::error::{EngineError, Result};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fixed-size pool that maps a function over a slice
#[derive(Debug)]
pub struct WorkerPool {
    threads: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Create a pool with at most `max_concurrency` workers
    pub fn new(max_concurrency: usize) -> Result<Self> {
        if max_concurrency == 0 {
            return Err(EngineError::ConfigError(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(max_concurrency)
                .thread_name(|i| format!("protmap-lookup-{i}"))
                .build()
                .map_err(|e| EngineError::ThreadPool(e.to_string()))?;
            Ok(Self {
                threads: max_concurrency,
                pool,
            })
        }

        #[cfg(not(feature = "parallel"))]
        {
            log::debug!(
                "parallel feature disabled, ignoring max_concurrency {}",
                max_concurrency
            );
            Ok(Self { threads: 1 })
        }
    }

    /// Single worker
    pub fn sequential() -> Result<Self> {
        Self::new(1)
    }

    /// Number of workers
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Apply `f` to every item; output order matches input order
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            if self.threads > 1 && items.len() > 1 {
                return self.pool.install(|| items.par_iter().map(&f).collect());
            }
        }
        items.iter().map(f).collect()
    }
}
