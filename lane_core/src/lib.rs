//! Per-cell dispatch over a pool of compute lanes.
//!
//! Every dispatch call on `Lanes` returns only after all lanes have finished
//! their share of the cells, so consecutive calls are separated by a full
//! barrier. Cells are handed out as disjoint mutable chunks of the output
//! buffers; a lane never sees another lane's cells within one call.

#[cfg(feature = "threads")]
use rayon::prelude::*;
#[cfg(feature = "threads")]
use std::sync::Arc;

/// An error type for failures to bring up the compute lanes
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("the lane count must be at least one")]
    NoLanes,

    #[error("compiled without thread-pool support")]
    CompiledWithoutThreads,

    #[error("could not build the thread pool: {0}")]
    PoolBuild(String),
}

/// The set of workers that per-cell kernels are dispatched to.
#[derive(Clone)]
pub enum Lanes {
    /// All cells are visited in index order on the calling thread.
    Serial,
    /// Cells are distributed over a dedicated rayon thread pool.
    #[cfg(feature = "threads")]
    Pool(Arc<rayon::ThreadPool>),
}

impl Default for Lanes {
    fn default() -> Self {
        Self::serial()
    }
}

impl std::fmt::Debug for Lanes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serial => write!(f, "Lanes::Serial"),
            #[cfg(feature = "threads")]
            Self::Pool(pool) => write!(f, "Lanes::Pool({})", pool.current_num_threads()),
        }
    }
}

impl Lanes {
    pub fn serial() -> Self {
        Self::Serial
    }

    /// Creates a pool with the given number of lanes. A `NoLanes` error is
    /// returned for a zero count, and `CompiledWithoutThreads` if the crate
    /// was built without `feature=threads`.
    pub fn with_threads(num_threads: usize) -> Result<Self, Error> {
        if num_threads == 0 {
            return Err(Error::NoLanes);
        }
        Self::build_pool(num_threads)
    }

    #[cfg(feature = "threads")]
    fn build_pool(num_threads: usize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("lane-{}", i))
            .build()
            .map_err(|e| Error::PoolBuild(e.to_string()))?;
        Ok(Self::Pool(Arc::new(pool)))
    }

    #[cfg(not(feature = "threads"))]
    fn build_pool(_num_threads: usize) -> Result<Self, Error> {
        Err(Error::CompiledWithoutThreads)
    }

    /// Returns the number of workers cells are spread over.
    pub fn num_lanes(&self) -> usize {
        match self {
            Self::Serial => 1,
            #[cfg(feature = "threads")]
            Self::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Visits every cell of `out`, which holds `width` values per cell,
    /// passing the cell index and its mutable chunk to `f`.
    pub fn for_each_cell<F>(&self, out: &mut [f64], width: usize, f: F)
    where
        F: Fn(usize, &mut [f64]) + Send + Sync,
    {
        match self {
            Self::Serial => {
                for (i, cell) in out.chunks_exact_mut(width).enumerate() {
                    f(i, cell)
                }
            }
            #[cfg(feature = "threads")]
            Self::Pool(pool) => pool.install(|| {
                out.par_chunks_exact_mut(width)
                    .enumerate()
                    .for_each(|(i, cell)| f(i, cell))
            }),
        }
    }

    /// Like `for_each_cell`, but writes two buffers of the same shape in
    /// lock step.
    pub fn for_each_cell2<F>(&self, out_a: &mut [f64], out_b: &mut [f64], width: usize, f: F)
    where
        F: Fn(usize, &mut [f64], &mut [f64]) + Send + Sync,
    {
        assert_eq!(out_a.len(), out_b.len(), "paired buffers must have equal length");
        match self {
            Self::Serial => {
                for (i, (a, b)) in out_a
                    .chunks_exact_mut(width)
                    .zip(out_b.chunks_exact_mut(width))
                    .enumerate()
                {
                    f(i, a, b)
                }
            }
            #[cfg(feature = "threads")]
            Self::Pool(pool) => pool.install(|| {
                out_a
                    .par_chunks_exact_mut(width)
                    .zip(out_b.par_chunks_exact_mut(width))
                    .enumerate()
                    .for_each(|(i, (a, b))| f(i, a, b))
            }),
        }
    }

    /// Visits every cell with a fallible kernel. If any cells fail, the error
    /// of the lowest-indexed failing cell is returned, regardless of the
    /// order the lanes ran in.
    pub fn try_for_each_cell<E, F>(&self, out: &mut [f64], width: usize, f: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(usize, &mut [f64]) -> Result<(), E> + Send + Sync,
    {
        match self {
            Self::Serial => {
                for (i, cell) in out.chunks_exact_mut(width).enumerate() {
                    f(i, cell)?
                }
                Ok(())
            }
            #[cfg(feature = "threads")]
            Self::Pool(pool) => pool.install(|| {
                let first_failure = out
                    .par_chunks_exact_mut(width)
                    .enumerate()
                    .filter_map(|(i, cell)| f(i, cell).err().map(|e| (i, e)))
                    .min_by_key(|(i, _)| *i);
                match first_failure {
                    Some((_, e)) => Err(e),
                    None => Ok(()),
                }
            }),
        }
    }

    /// Returns the largest value of `f` over the cell indexes
    /// `0..num_cells`, or `None` if there are no cells.
    pub fn maximum<F>(&self, num_cells: usize, f: F) -> Option<f64>
    where
        F: Fn(usize) -> f64 + Send + Sync,
    {
        match self {
            Self::Serial => (0..num_cells).map(f).reduce(f64::max),
            #[cfg(feature = "threads")]
            Self::Pool(pool) => pool.install(|| (0..num_cells).into_par_iter().map(f).reduce_with(f64::max)),
        }
    }
}
